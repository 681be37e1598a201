//! User-configurable gesture handlers
//!
//! A handler is what a recognized gesture does. Handlers are stored as
//! `{"class": "...", "config": {...}}` so they can live in the launcher
//! config file or be passed around as JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::ControllerAction;
use crate::state::VisualState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", content = "config", rename_all = "snake_case")]
pub enum GestureHandler {
    /// Does nothing
    Blank,
    OpenNotifications,
    OpenOverview,
    GoHome,
    StartApp { exec: String },
}

impl GestureHandler {
    pub fn display_name(&self) -> &'static str {
        match self {
            GestureHandler::Blank => "None",
            GestureHandler::OpenNotifications => "Open notifications",
            GestureHandler::OpenOverview => "Open overview",
            GestureHandler::GoHome => "Go home",
            GestureHandler::StartApp { .. } => "Start app",
        }
    }

    pub fn has_config(&self) -> bool {
        matches!(self, GestureHandler::StartApp { .. })
    }

    /// Action to run when the bound gesture completes
    pub fn on_gesture_trigger(&self) -> ControllerAction {
        match self {
            GestureHandler::Blank => ControllerAction::None,
            GestureHandler::OpenNotifications => ControllerAction::OpenNotifications,
            GestureHandler::OpenOverview => ControllerAction::GoToState(VisualState::Overview),
            GestureHandler::GoHome => ControllerAction::GoToState(VisualState::Normal),
            GestureHandler::StartApp { exec } => ControllerAction::StartApp(exec.clone()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for GestureHandler {
    fn default() -> Self {
        GestureHandler::OpenNotifications
    }
}
