//! Workspace items handed through the launcher core

/// Where an item lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Desktop,
    Hotseat,
}

/// A shortcut on the workspace or in the hotseat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub id: u32,
    pub title: String,
    /// Command used to start the app
    pub exec: String,
    pub container: Container,
}

impl ItemInfo {
    pub fn new(id: u32, title: &str, exec: &str, container: Container) -> Self {
        Self {
            id,
            title: title.to_string(),
            exec: exec.to_string(),
            container,
        }
    }
}

/// A folder on the workspace or in the hotseat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    pub id: u32,
    pub title: String,
    pub container: Container,
    pub contents: Vec<ItemInfo>,
}

/// Entries offered in an item's long-press popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemShortcut {
    AppInfo,
    Widgets,
    Install,
    /// Pin a predicted app into the hotseat
    PinPrediction,
}

/// Shortcuts every launcher offers regardless of features
pub fn default_shortcuts() -> Vec<SystemShortcut> {
    vec![SystemShortcut::AppInfo, SystemShortcut::Widgets, SystemShortcut::Install]
}
