//! Hotseat prediction lifecycle
//!
//! Predictions are an optional feature. The launcher always talks to a
//! [`PredictionBridge`]; when the feature is off the bridge is empty and
//! every call is a no-op, so call sites never check the flag themselves.
//!
//! The bridge also enforces the lifecycle: the predictor is created once,
//! after the first item bind, and destroyed once, at teardown. After
//! destroy the predictor is dropped and never called again.

use tracing::{debug, info};

use crate::model::{FolderInfo, ItemInfo};

/// Prediction row backing the hotseat
pub trait HotseatPredictor {
    /// Start the predictor session; called once
    fn create_predictor(&mut self);

    /// Stop or resume updating the prediction row on screen
    fn set_pause_ui_update(&mut self, paused: bool);

    fn folder_created_from_item(&mut self, item: &ItemInfo, folder: &FolderInfo);

    fn folder_converted_to_item(&mut self, item: &ItemInfo, folder: &FolderInfo);

    fn destroy(&mut self);
}

/// Lifecycle position of the prediction capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionState {
    Uncreated,
    Active,
    Paused,
    Destroyed,
}

/// Optional predictor plus its lifecycle bookkeeping
pub struct PredictionBridge {
    predictor: Option<Box<dyn HotseatPredictor>>,
    created: bool,
    paused: bool,
    destroyed: bool,
}

impl PredictionBridge {
    pub fn new(predictor: Box<dyn HotseatPredictor>) -> Self {
        Self {
            predictor: Some(predictor),
            created: false,
            paused: false,
            destroyed: false,
        }
    }

    /// Feature disabled
    pub fn absent() -> Self {
        Self {
            predictor: None,
            created: false,
            paused: false,
            destroyed: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn state(&self) -> PredictionState {
        if self.destroyed {
            PredictionState::Destroyed
        } else if !self.created {
            PredictionState::Uncreated
        } else if self.paused {
            PredictionState::Paused
        } else {
            PredictionState::Active
        }
    }

    /// Item binding finished; only the first call creates the predictor
    pub fn create_on_first_item_bind(&mut self) {
        let Some(predictor) = self.predictor.as_mut() else {
            return;
        };
        if self.created {
            debug!("Predictor already created, ignoring rebind");
            return;
        }
        self.created = true;
        info!("Creating hotseat predictor");
        predictor.create_predictor();
    }

    /// Launching something outside the launcher
    pub fn pause(&mut self) {
        if let Some(predictor) = self.predictor.as_mut() {
            self.paused = true;
            predictor.set_pause_ui_update(true);
        }
    }

    pub fn resume(&mut self) {
        if let Some(predictor) = self.predictor.as_mut() {
            self.paused = false;
            predictor.set_pause_ui_update(false);
        }
    }

    pub fn notify_folder_created_from_item(&mut self, item: &ItemInfo, folder: &FolderInfo) {
        if let Some(predictor) = self.predictor.as_mut() {
            predictor.folder_created_from_item(item, folder);
        }
    }

    pub fn notify_folder_converted_from_item(&mut self, item: &ItemInfo, folder: &FolderInfo) {
        if let Some(predictor) = self.predictor.as_mut() {
            predictor.folder_converted_to_item(item, folder);
        }
    }

    /// Tear down; later calls of any kind are no-ops
    pub fn destroy(&mut self) {
        if let Some(mut predictor) = self.predictor.take() {
            self.destroyed = true;
            info!("Destroying hotseat predictor");
            predictor.destroy();
        } else if self.destroyed {
            debug!("Predictor already destroyed");
        }
    }
}

/// Predictor that only logs, for running without a prediction service
#[derive(Debug, Default)]
pub struct LoggingPredictor;

impl HotseatPredictor for LoggingPredictor {
    fn create_predictor(&mut self) {
        info!("Prediction session started");
    }

    fn set_pause_ui_update(&mut self, paused: bool) {
        info!(paused, "Prediction row updates");
    }

    fn folder_created_from_item(&mut self, item: &ItemInfo, folder: &FolderInfo) {
        info!("Folder {:?} created from {:?}", folder.title, item.title);
    }

    fn folder_converted_to_item(&mut self, item: &ItemInfo, folder: &FolderInfo) {
        info!("Folder {:?} converted to {:?}", folder.title, item.title);
    }

    fn destroy(&mut self) {
        info!("Prediction session ended");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::model::Container;

    #[test]
    fn test_create_only_once() {
        let recorder = RecordingPredictor::default();
        let mut bridge = PredictionBridge::new(Box::new(recorder.clone()));
        assert_eq!(bridge.state(), PredictionState::Uncreated);

        for _ in 0..5 {
            bridge.create_on_first_item_bind();
        }

        assert_eq!(recorder.count(&Call::Create), 1);
        assert_eq!(bridge.state(), PredictionState::Active);
    }

    #[test]
    fn test_pause_resume() {
        let recorder = RecordingPredictor::default();
        let mut bridge = PredictionBridge::new(Box::new(recorder.clone()));
        bridge.create_on_first_item_bind();

        bridge.pause();
        assert_eq!(bridge.state(), PredictionState::Paused);
        bridge.resume();
        assert_eq!(bridge.state(), PredictionState::Active);
        assert_eq!(recorder.calls(), vec![Call::Create, Call::Pause(true), Call::Pause(false)]);
    }

    #[test]
    fn test_no_calls_after_destroy() {
        let recorder = RecordingPredictor::default();
        let mut bridge = PredictionBridge::new(Box::new(recorder.clone()));
        let item = ItemInfo::new(3, "XCalc", "xcalc", Container::Desktop);
        let folder = FolderInfo { id: 9, title: "Tools".into(), container: Container::Desktop, contents: vec![] };

        bridge.create_on_first_item_bind();
        bridge.notify_folder_created_from_item(&item, &folder);
        bridge.destroy();
        bridge.destroy();
        bridge.pause();
        bridge.resume();
        bridge.create_on_first_item_bind();
        bridge.notify_folder_converted_from_item(&item, &folder);

        assert_eq!(recorder.calls(), vec![Call::Create, Call::FolderCreated(3, 9), Call::Destroy]);
        assert_eq!(bridge.state(), PredictionState::Destroyed);
        assert!(!bridge.is_present());
    }

    #[test]
    fn test_absent_bridge_is_noop() {
        let mut bridge = PredictionBridge::absent();
        bridge.create_on_first_item_bind();
        bridge.pause();
        bridge.destroy();
        assert!(!bridge.is_present());
        assert_eq!(bridge.state(), PredictionState::Uncreated);
    }
}
