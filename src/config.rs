//! Launcher configuration loaded from `launcher.toml`
//!
//! ```toml
//! [features]
//! hybrid_hotseat = true
//! overview_actions = false
//!
//! [navigation]
//! mode = "no_button"
//!
//! [gestures]
//! touch_slop = 24.0
//!
//! [gestures.swipe_down]
//! class = "start_app"
//! config = { exec = "xterm" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handlers::GestureHandler;
use crate::input::{
    FixedNavigationMode, GestureConfig, NavigationMode, NavigationModeProvider,
    SettingsNavigationMode,
};

/// Runtime feature flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Prediction row in the hotseat
    pub hybrid_hotseat: bool,
    /// Swipe up from the gesture bar goes straight to overview
    pub overview_actions: bool,
}

/// Navigation mode as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NavigationModeSetting {
    ThreeButtons,
    TwoButtons,
    NoButton,
}

impl From<NavigationModeSetting> for NavigationMode {
    fn from(setting: NavigationModeSetting) -> Self {
        match setting {
            NavigationModeSetting::ThreeButtons => NavigationMode::THREE_BUTTONS,
            NavigationModeSetting::TwoButtons => NavigationMode::TWO_BUTTONS,
            NavigationModeSetting::NoButton => NavigationMode::NO_BUTTON,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Pin the mode instead of following the system setting
    pub mode: Option<NavigationModeSetting>,
    /// File holding the system navigation setting
    pub settings_path: PathBuf,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mode: None,
            settings_path: SettingsNavigationMode::default_path(),
        }
    }
}

impl NavigationConfig {
    pub fn provider(&self) -> Box<dyn NavigationModeProvider> {
        match self.mode {
            Some(mode) => Box::new(FixedNavigationMode(mode.into())),
            None => Box::new(SettingsNavigationMode::new(self.settings_path.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturesConfig {
    #[serde(flatten)]
    pub thresholds: GestureConfig,
    /// Handler for the status bar pull-down on home
    pub swipe_down: GestureHandler,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub features: FeatureFlags,
    pub navigation: NavigationConfig,
    pub gestures: GesturesConfig,
}

impl LauncherConfig {
    /// `$XDG_CONFIG_HOME/flick/launcher.toml`, falling back to `~/.config`
    pub fn default_path() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("flick/launcher.toml")
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load the config, falling back to defaults on any problem
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No launcher config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded launcher config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to load launcher config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LauncherConfig::parse("").unwrap();
        assert!(!config.features.hybrid_hotseat);
        assert!(!config.features.overview_actions);
        assert!(config.navigation.mode.is_none());
        assert_eq!(config.gestures.swipe_down, GestureHandler::OpenNotifications);
        assert_eq!(config.gestures.thresholds.touch_slop, 30.0);
    }

    #[test]
    fn test_full_config() {
        let config = LauncherConfig::parse(
            r#"
            [features]
            hybrid_hotseat = true

            [navigation]
            mode = "two_buttons"

            [gestures]
            touch_slop = 24.0

            [gestures.swipe_down]
            class = "start_app"
            config = { exec = "xterm" }
            "#,
        )
        .unwrap();

        assert!(config.features.hybrid_hotseat);
        assert_eq!(config.navigation.mode, Some(NavigationModeSetting::TwoButtons));
        assert_eq!(config.navigation.provider().current_mode(), NavigationMode::TWO_BUTTONS);
        assert_eq!(config.gestures.thresholds.touch_slop, 24.0);
        assert_eq!(config.gestures.thresholds.edge_threshold, 80.0);
        assert_eq!(
            config.gestures.swipe_down,
            GestureHandler::StartApp { exec: "xterm".to_string() }
        );
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.toml");
        std::fs::write(&path, "[features]\nhybrid_hotseat = \"yes please\"\n").unwrap();

        assert!(LauncherConfig::load(&path).is_err());
        let config = LauncherConfig::load_or_default(&path);
        assert!(!config.features.hybrid_hotseat);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::load_or_default(&dir.path().join("nope.toml"));
        assert!(config.navigation.mode.is_none());
    }
}
