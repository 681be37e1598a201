//! System navigation mode
//!
//! The mode is a system setting that can change while the launcher runs, so
//! consumers ask the provider at every decision point instead of holding on
//! to a value.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

/// How back/home/recents are invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// On-screen buttons; `has_gestures` is the two-button variant with a
    /// swipeable home pill
    Button { has_gestures: bool },
    /// Fully gestural, no nav bar buttons
    NoButton,
}

impl NavigationMode {
    pub const THREE_BUTTONS: NavigationMode = NavigationMode::Button { has_gestures: false };
    pub const TWO_BUTTONS: NavigationMode = NavigationMode::Button { has_gestures: true };
    pub const NO_BUTTON: NavigationMode = NavigationMode::NoButton;

    pub fn has_gestures(self) -> bool {
        match self {
            NavigationMode::Button { has_gestures } => has_gestures,
            NavigationMode::NoButton => true,
        }
    }

    /// Parse the system setting value (0 = three buttons, 1 = two buttons, 2 = gestural)
    pub fn from_setting(value: &str) -> Option<NavigationMode> {
        match value.trim() {
            "0" => Some(Self::THREE_BUTTONS),
            "1" => Some(Self::TWO_BUTTONS),
            "2" => Some(Self::NO_BUTTON),
            _ => None,
        }
    }
}

impl Default for NavigationMode {
    /// Most restrictive set of gesture recognizers
    fn default() -> Self {
        Self::THREE_BUTTONS
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationMode::Button { has_gestures: false } => f.write_str("three-buttons"),
            NavigationMode::Button { has_gestures: true } => f.write_str("two-buttons"),
            NavigationMode::NoButton => f.write_str("no-button"),
        }
    }
}

/// Source of the current navigation mode
pub trait NavigationModeProvider {
    fn current_mode(&self) -> NavigationMode;
}

/// Always reports the same mode (config override, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedNavigationMode(pub NavigationMode);

impl NavigationModeProvider for FixedNavigationMode {
    fn current_mode(&self) -> NavigationMode {
        self.0
    }
}

/// Reads the system navigation setting from a file on every query
#[derive(Debug, Clone)]
pub struct SettingsNavigationMode {
    path: PathBuf,
}

impl SettingsNavigationMode {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `/run/flick/navigation_mode`, or `$FLICK_STATE_DIR/navigation_mode`
    pub fn default_path() -> PathBuf {
        if let Ok(state_dir) = std::env::var("FLICK_STATE_DIR") {
            return PathBuf::from(state_dir).join("navigation_mode");
        }
        PathBuf::from("/run/flick/navigation_mode")
    }
}

impl NavigationModeProvider for SettingsNavigationMode {
    fn current_mode(&self) -> NavigationMode {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => NavigationMode::from_setting(&contents).unwrap_or_else(|| {
                debug!("Unrecognized navigation mode {:?}, using buttons", contents.trim());
                NavigationMode::default()
            }),
            Err(e) => {
                debug!("Navigation mode unavailable ({:?}: {}), using buttons", self.path, e);
                NavigationMode::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_values() {
        assert_eq!(NavigationMode::from_setting("0\n"), Some(NavigationMode::THREE_BUTTONS));
        assert_eq!(NavigationMode::from_setting("1"), Some(NavigationMode::TWO_BUTTONS));
        assert_eq!(NavigationMode::from_setting("2"), Some(NavigationMode::NO_BUTTON));
        assert_eq!(NavigationMode::from_setting("gestural"), None);
        assert!(!NavigationMode::THREE_BUTTONS.has_gestures());
        assert!(NavigationMode::TWO_BUTTONS.has_gestures());
    }

    #[test]
    fn test_missing_setting_falls_back_to_buttons() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SettingsNavigationMode::new(dir.path().join("missing"));
        assert_eq!(provider.current_mode(), NavigationMode::THREE_BUTTONS);
    }

    #[test]
    fn test_setting_read_fresh_each_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navigation_mode");
        let provider = SettingsNavigationMode::new(path.clone());

        std::fs::write(&path, "2").unwrap();
        assert_eq!(provider.current_mode(), NavigationMode::NO_BUTTON);

        std::fs::write(&path, "1").unwrap();
        assert_eq!(provider.current_mode(), NavigationMode::TWO_BUTTONS);

        std::fs::write(&path, "bogus").unwrap();
        assert_eq!(provider.current_mode(), NavigationMode::THREE_BUTTONS);
    }
}
