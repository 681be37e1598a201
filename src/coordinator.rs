//! Keeps shelf and prediction state in step with the launcher lifecycle
//!
//! On every relevant trigger the shelf `(visible, height)` pair is
//! recomputed from the authoritative state and dispatched to the background
//! applier. There is no change detection: dispatching the same pair twice
//! is harmless and keeps the system UI correct under races.

use tracing::debug;

use crate::device::DeviceProfile;
use crate::dispatch::{PropertyDispatcher, ShelfState};
use crate::overview::OverviewPanel;
use crate::prediction::PredictionBridge;
use crate::state::{ActivityFlags, StateManager, VisualState};

/// Shelf as it should look for the given state
pub fn shelf_state(state: VisualState, user_active: bool, profile: &DeviceProfile) -> ShelfState {
    ShelfState {
        visible: state.shows_shelf() && user_active && !profile.is_vertical_bar_layout(),
        height_px: profile.hotseat_bar_size_px,
    }
}

/// Whether a flag change should recompute the shelf
///
/// An in-flight transition suppresses recomputation; only the resulting
/// flags are checked, not whether the transition bit flipped in this change.
pub fn should_recompute(changed: &ActivityFlags, flags: &ActivityFlags) -> bool {
    let relevant = changed.deferred_resumed
        || changed.started
        || changed.user_active
        || changed.transition_active;
    relevant && !flags.transition_active
}

/// Whether a flag change means the user is back and predictions may update
pub fn should_resume_predictions(changed: &ActivityFlags, flags: &ActivityFlags) -> bool {
    changed.started || changed.intersect(flags).deferred_resumed
}

pub struct StateCoordinator {
    shelf: PropertyDispatcher,
}

impl StateCoordinator {
    pub fn new(shelf: PropertyDispatcher) -> Self {
        Self { shelf }
    }

    /// Recompute and dispatch the shelf; on home, stop swipe-down from launching tasks
    pub fn on_state_or_resume_changed(
        &self,
        state_manager: &StateManager,
        flags: &ActivityFlags,
        profile: &DeviceProfile,
        overview: &mut dyn OverviewPanel,
    ) -> ShelfState {
        let state = state_manager.state();
        let shelf = shelf_state(state, flags.user_active, profile);
        debug!(%state, visible = shelf.visible, height_px = shelf.height_px, "Dispatching shelf state");
        self.shelf.dispatch(shelf.visible, shelf.height_px);

        if state == VisualState::Normal {
            overview.set_swipe_down_should_launch_app(false);
        }
        shelf
    }

    /// React to a change in activity flags
    ///
    /// `changed` holds the flags that flipped, `flags` the resulting flags.
    /// Returns the dispatched shelf state when a recompute happened.
    pub fn on_activity_flags_changed(
        &self,
        changed: &ActivityFlags,
        flags: &ActivityFlags,
        state_manager: &StateManager,
        profile: &DeviceProfile,
        overview: &mut dyn OverviewPanel,
        predictions: &mut PredictionBridge,
    ) -> Option<ShelfState> {
        let shelf = if should_recompute(changed, flags) {
            Some(self.on_state_or_resume_changed(state_manager, flags, profile, overview))
        } else {
            if flags.transition_active {
                debug!("Transition active, shelf update deferred");
            }
            None
        };

        if should_resume_predictions(changed, flags) {
            predictions.resume();
        }
        shelf
    }

    /// Navigating away from the launcher: freeze the prediction row now
    pub fn on_launching_external_activity(&self, predictions: &mut PredictionBridge) {
        predictions.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::TestShelf;
    use crate::overview::RecentsView;
    use crate::prediction::testing::{Call, RecordingPredictor};

    fn active() -> ActivityFlags {
        ActivityFlags {
            started: true,
            resumed: true,
            user_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_shelf_hidden_in_vertical_bar_layout() {
        let landscape = DeviceProfile::default().rotated();
        for state in [
            VisualState::Normal,
            VisualState::Overview,
            VisualState::AllApps,
            VisualState::SpringLoaded,
            VisualState::BackgroundApp,
            VisualState::QuickSwitch,
        ] {
            for user_active in [false, true] {
                assert!(!shelf_state(state, user_active, &landscape).visible);
            }
        }
    }

    #[test]
    fn test_shelf_visibility() {
        let profile = DeviceProfile::default();
        assert!(shelf_state(VisualState::Normal, true, &profile).visible);
        assert!(shelf_state(VisualState::Overview, true, &profile).visible);
        assert!(!shelf_state(VisualState::AllApps, true, &profile).visible);
        assert!(!shelf_state(VisualState::Normal, false, &profile).visible);
        assert_eq!(shelf_state(VisualState::AllApps, true, &profile).height_px, 220);
    }

    #[test]
    fn test_normal_state_dispatch_and_latch() {
        let mut shelf = TestShelf::new();
        let coordinator = StateCoordinator::new(shelf.dispatcher.clone());
        let profile = DeviceProfile::default();
        let mut recents = RecentsView::new(&profile);
        assert!(recents.swipe_down_should_launch_app());

        coordinator.on_state_or_resume_changed(&StateManager::default(), &active(), &profile, &mut recents);
        shelf.drain();

        assert_eq!(shelf.applied(), vec![ShelfState { visible: true, height_px: 220 }]);
        assert!(!recents.swipe_down_should_launch_app());
    }

    #[test]
    fn test_overview_leaves_latch_alone() {
        let shelf = TestShelf::new();
        let coordinator = StateCoordinator::new(shelf.dispatcher.clone());
        let profile = DeviceProfile::default();
        let mut recents = RecentsView::new(&profile);

        coordinator.on_state_or_resume_changed(
            &StateManager::new(VisualState::Overview),
            &active(),
            &profile,
            &mut recents,
        );
        assert!(recents.swipe_down_should_launch_app());
    }

    #[test]
    fn test_repeated_trigger_dispatches_again() {
        let mut shelf = TestShelf::new();
        let coordinator = StateCoordinator::new(shelf.dispatcher.clone());
        let profile = DeviceProfile::default();
        let mut recents = RecentsView::new(&profile);
        let state_manager = StateManager::default();

        coordinator.on_state_or_resume_changed(&state_manager, &active(), &profile, &mut recents);
        shelf.drain();
        coordinator.on_state_or_resume_changed(&state_manager, &active(), &profile, &mut recents);
        shelf.drain();

        let applied = shelf.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], applied[1]);
    }

    #[test]
    fn test_recompute_conditions() {
        let started = ActivityFlags { started: true, ..Default::default() };
        let focus = ActivityFlags { window_focused: true, ..Default::default() };
        let transition = ActivityFlags { transition_active: true, ..Default::default() };

        assert!(should_recompute(&started, &active()));
        // Irrelevant bit
        assert!(!should_recompute(&focus, &active()));
        // Transition in flight
        let in_transition = ActivityFlags { transition_active: true, ..active() };
        assert!(!should_recompute(&started, &in_transition));
        // Transition just ended
        assert!(should_recompute(&transition, &active()));
    }

    #[test]
    fn test_transition_set_and_cleared_in_one_report() {
        // The bit flipped twice between reports: it shows as unchanged and
        // the resulting flags decide, so the started change recomputes.
        let changed = ActivityFlags { started: true, ..Default::default() };
        assert!(should_recompute(&changed, &active()));

        // A report where the bit changed and is still set suppresses.
        let changed = ActivityFlags { started: true, transition_active: true, ..Default::default() };
        let flags = ActivityFlags { transition_active: true, ..active() };
        assert!(!should_recompute(&changed, &flags));
    }

    #[test]
    fn test_prediction_resume_conditions() {
        let deferred = ActivityFlags { deferred_resumed: true, ..Default::default() };
        let with_deferred = ActivityFlags { deferred_resumed: true, ..active() };

        assert!(should_resume_predictions(&ActivityFlags { started: true, ..Default::default() }, &active()));
        assert!(should_resume_predictions(&deferred, &with_deferred));
        // Deferred-resumed just cleared
        assert!(!should_resume_predictions(&deferred, &active()));
        assert!(!should_resume_predictions(&ActivityFlags { user_active: true, ..Default::default() }, &with_deferred));
    }

    #[test]
    fn test_flags_change_drives_predictions() {
        let shelf = TestShelf::new();
        let coordinator = StateCoordinator::new(shelf.dispatcher.clone());
        let profile = DeviceProfile::default();
        let mut recents = RecentsView::new(&profile);
        let recorder = RecordingPredictor::default();
        let mut predictions = PredictionBridge::new(Box::new(recorder.clone()));

        coordinator.on_launching_external_activity(&mut predictions);
        let changed = ActivityFlags { started: true, ..Default::default() };
        let result = coordinator.on_activity_flags_changed(
            &changed,
            &active(),
            &StateManager::default(),
            &profile,
            &mut recents,
            &mut predictions,
        );

        assert!(result.is_some());
        assert_eq!(recorder.calls(), vec![Call::Pause(true), Call::Pause(false)]);
    }

    #[test]
    fn test_transition_suppresses_shelf_not_resume() {
        let mut shelf = TestShelf::new();
        let coordinator = StateCoordinator::new(shelf.dispatcher.clone());
        let profile = DeviceProfile::default();
        let mut recents = RecentsView::new(&profile);
        let recorder = RecordingPredictor::default();
        let mut predictions = PredictionBridge::new(Box::new(recorder.clone()));

        let changed = ActivityFlags { started: true, ..Default::default() };
        let flags = ActivityFlags { transition_active: true, ..active() };
        let result = coordinator.on_activity_flags_changed(
            &changed,
            &flags,
            &StateManager::default(),
            &profile,
            &mut recents,
            &mut predictions,
        );
        shelf.drain();

        assert!(result.is_none());
        assert!(shelf.applied().is_empty());
        assert_eq!(recorder.calls(), vec![Call::Pause(false)]);
    }
}
