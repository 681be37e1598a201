//! Launcher host - the entry points the shell calls
//!
//! Owns the authoritative visual state, activity flags, device profile and
//! the touch controller set, and routes lifecycle events to the state
//! coordinator and the prediction bridge. Everything here runs on the UI
//! thread; only shelf application happens elsewhere.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{FeatureFlags, LauncherConfig};
use crate::coordinator::StateCoordinator;
use crate::device::DeviceProfile;
use crate::dispatch::{PropertyDispatcher, ShelfState};
use crate::input::{
    build_controllers, ControllerAction, ControllerContext, ControllerKind, ControllerParams,
    DragController, NavigationModeProvider, Point, TaskViewHooks, TouchDispatcher,
};
use crate::model::{default_shortcuts, FolderInfo, ItemInfo, SystemShortcut};
use crate::overview::RecentsView;
use crate::prediction::{HotseatPredictor, PredictionBridge, PredictionState};
use crate::state::{ActivityFlags, StateManager, VisualState};

pub struct Launcher {
    config: LauncherConfig,
    navigation: Box<dyn NavigationModeProvider>,
    profile: DeviceProfile,
    flags: ActivityFlags,
    state_manager: Rc<RefCell<StateManager>>,
    recents: RecentsView,
    coordinator: StateCoordinator,
    predictions: PredictionBridge,
    drag_controller: DragController,
    touch: TouchDispatcher,
    /// Apps started through `start_activity_safely`
    launched: Vec<String>,
    destroyed: bool,
}

impl Launcher {
    /// `predictor` is only used when the hybrid hotseat feature is on
    pub fn new(
        config: LauncherConfig,
        navigation: Box<dyn NavigationModeProvider>,
        profile: DeviceProfile,
        shelf: PropertyDispatcher,
        predictor: Option<Box<dyn HotseatPredictor>>,
    ) -> Self {
        let predictions = match predictor {
            Some(predictor) if config.features.hybrid_hotseat => PredictionBridge::new(predictor),
            _ => PredictionBridge::absent(),
        };

        let state_manager = Rc::new(RefCell::new(StateManager::default()));
        let drag_controller = DragController::default();
        let controllers = Self::build_touch_controllers(
            &config,
            navigation.as_ref(),
            &profile,
            &drag_controller,
            &state_manager,
        );
        let touch = TouchDispatcher::new(config.gestures.thresholds.clone(), controllers);

        info!(
            predictions = predictions.is_present(),
            overview_actions = config.features.overview_actions,
            "Launcher created"
        );

        Self {
            recents: RecentsView::new(&profile),
            config,
            navigation,
            profile,
            flags: ActivityFlags::default(),
            state_manager,
            coordinator: StateCoordinator::new(shelf),
            predictions,
            drag_controller,
            touch,
            launched: Vec::new(),
            destroyed: false,
        }
    }

    fn build_touch_controllers(
        config: &LauncherConfig,
        navigation: &dyn NavigationModeProvider,
        profile: &DeviceProfile,
        drag_controller: &DragController,
        state_manager: &Rc<RefCell<StateManager>>,
    ) -> crate::input::ControllerSet {
        let params = ControllerParams {
            mode: navigation.current_mode(),
            is_vertical_layout: profile.is_vertical_bar_layout(),
            is_multi_window: profile.is_multi_window_mode,
            overview_actions_enabled: config.features.overview_actions,
        };
        build_controllers(
            params,
            drag_controller.clone(),
            TaskViewHooks::for_state_manager(state_manager),
            config.gestures.swipe_down.clone(),
        )
    }

    /// Rebuild the controller set from the current mode, layout and flags
    pub fn create_touch_controllers(&mut self) {
        let controllers = Self::build_touch_controllers(
            &self.config,
            self.navigation.as_ref(),
            &self.profile,
            &self.drag_controller,
            &self.state_manager,
        );
        self.touch.set_controllers(controllers);
    }

    pub fn touch_controllers(&self) -> Vec<ControllerKind> {
        self.touch.controllers().kinds()
    }

    /// The system navigation setting changed
    pub fn on_navigation_mode_changed(&mut self) {
        if self.destroyed {
            return;
        }
        self.create_touch_controllers();
    }

    /// Runtime feature flags changed
    ///
    /// `overview_actions` takes effect through a full controller rebuild.
    /// The hotseat prediction feature is fixed for the launcher's lifetime.
    pub fn set_feature_flags(&mut self, flags: FeatureFlags) {
        if self.destroyed {
            return;
        }
        if flags.hybrid_hotseat != self.config.features.hybrid_hotseat {
            debug!("hybrid_hotseat only applies to a new launcher");
        }
        self.config.features.overview_actions = flags.overview_actions;
        self.create_touch_controllers();
    }

    pub fn feature_flags(&self) -> &FeatureFlags {
        &self.config.features
    }

    /// New layout (rotation, multi-window, resize)
    pub fn on_configuration_changed(&mut self, profile: DeviceProfile) {
        if self.destroyed {
            return;
        }
        debug!(?profile, "Configuration changed");
        self.recents.on_device_profile_changed(&profile);
        self.profile = profile;
        self.create_touch_controllers();
        self.on_state_or_resume_changed();
    }

    /// Replace the activity flags; the changed set is derived from the old flags
    pub fn set_activity_flags(&mut self, flags: ActivityFlags) {
        let changed = flags.changed_from(&self.flags);
        self.flags = flags;
        if !changed.is_empty() {
            self.on_activity_flags_changed(changed);
        }
    }

    /// Host-platform bitmask variant of [`Launcher::set_activity_flags`]
    pub fn set_activity_flag_bits(&mut self, bits: u32) {
        self.set_activity_flags(ActivityFlags::from_bits(bits));
    }

    fn on_activity_flags_changed(&mut self, changed: ActivityFlags) {
        if self.destroyed {
            return;
        }
        let state_manager = self.state_manager.borrow();
        self.coordinator.on_activity_flags_changed(
            &changed,
            &self.flags,
            &state_manager,
            &self.profile,
            &mut self.recents,
            &mut self.predictions,
        );
    }

    fn on_state_or_resume_changed(&mut self) -> ShelfState {
        let state_manager = self.state_manager.borrow();
        self.coordinator.on_state_or_resume_changed(
            &state_manager,
            &self.flags,
            &self.profile,
            &mut self.recents,
        )
    }

    /// Finish a transition to `state`
    pub fn go_to_state(&mut self, state: VisualState) {
        if self.destroyed {
            return;
        }
        self.state_manager.borrow_mut().set_state(state);
        self.on_state_or_resume_changed();
    }

    pub fn state(&self) -> VisualState {
        self.state_manager.borrow().state()
    }

    pub fn activity_flags(&self) -> ActivityFlags {
        self.flags
    }

    pub fn is_user_active(&self) -> bool {
        self.flags.user_active
    }

    pub fn device_profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn recents(&self) -> &RecentsView {
        &self.recents
    }

    pub fn recents_mut(&mut self) -> &mut RecentsView {
        &mut self.recents
    }

    pub fn drag_controller(&self) -> &DragController {
        &self.drag_controller
    }

    pub fn state_manager(&self) -> &Rc<RefCell<StateManager>> {
        &self.state_manager
    }

    /// Start an app outside the launcher; predictions pause right away
    pub fn start_activity_safely(&mut self, item: &ItemInfo) -> bool {
        if self.destroyed {
            warn!("Launcher destroyed, not starting {}", item.exec);
            return false;
        }
        self.on_launching_external_activity();
        info!("Starting {:?} ({})", item.title, item.exec);
        self.launched.push(item.exec.clone());
        true
    }

    pub fn on_launching_external_activity(&mut self) {
        self.coordinator.on_launching_external_activity(&mut self.predictions);
    }

    pub fn launched(&self) -> &[String] {
        &self.launched
    }

    /// Items are bound; the first time this creates the predictor
    pub fn on_item_binding_finished(&mut self) {
        if self.destroyed {
            return;
        }
        self.predictions.create_on_first_item_bind();
    }

    pub fn on_folder_created_from_item(&mut self, folder: &FolderInfo, item: &ItemInfo) {
        self.predictions.notify_folder_created_from_item(item, folder);
    }

    pub fn on_folder_converted_to_item(&mut self, folder: &FolderInfo, item: &ItemInfo) {
        self.predictions.notify_folder_converted_from_item(item, folder);
    }

    pub fn on_destroy(&mut self) {
        if self.destroyed {
            debug!("Launcher already destroyed");
            return;
        }
        self.destroyed = true;
        self.touch.touch_cancel();
        self.predictions.destroy();
        info!("Launcher destroyed");
    }

    /// None when predictions are disabled
    pub fn prediction_state(&self) -> Option<PredictionState> {
        match self.predictions.state() {
            PredictionState::Destroyed => Some(PredictionState::Destroyed),
            state => self.predictions.is_present().then_some(state),
        }
    }

    pub fn supported_shortcuts(&self) -> Vec<SystemShortcut> {
        let mut shortcuts = default_shortcuts();
        if self.predictions.is_present() {
            shortcuts.push(SystemShortcut::PinPrediction);
        }
        shortcuts
    }

    pub fn on_touch_down(&mut self, pos: Point, time: Instant) {
        self.touch.touch_down(pos, time);
    }

    pub fn on_touch_motion(&mut self, pos: Point, time: Instant) {
        let ctx = ControllerContext {
            state: self.state(),
            profile: &self.profile,
        };
        if let Some(progress) = self.touch.touch_motion(pos, time, &ctx) {
            if let Some(animation) = self.state_manager.borrow_mut().current_animation_mut() {
                animation.progress = progress;
            }
        }
    }

    /// Finish the stream and run whatever the claiming controller decided
    pub fn on_touch_up(&mut self) -> ControllerAction {
        let action = self.touch.touch_up();
        self.state_manager.borrow_mut().clear_current_animation();
        self.apply_action(&action);
        action
    }

    pub fn on_touch_cancel(&mut self) {
        self.touch.touch_cancel();
        self.state_manager.borrow_mut().clear_current_animation();
    }

    fn apply_action(&mut self, action: &ControllerAction) {
        match action {
            ControllerAction::None => {}
            ControllerAction::GoToState(state) => self.go_to_state(*state),
            ControllerAction::QuickSwitch => {
                info!("Quick switch to previous task");
                self.go_to_state(VisualState::BackgroundApp);
            }
            ControllerAction::OpenNotifications => info!("Opening notifications"),
            ControllerAction::DismissTask { at } => {
                let id = self.recents.task_at(*at).map(|t| t.id);
                if let Some(task) = id.and_then(|id| self.recents.remove_task(id)) {
                    info!("Dismissed task {:?}", task.title);
                }
            }
            ControllerAction::LaunchTask { at } => {
                if !self.recents.swipe_down_should_launch_app() {
                    debug!("Swipe down to launch disabled");
                    return;
                }
                let title = self.recents.task_at(*at).map(|t| t.title.clone());
                if let Some(title) = title {
                    info!("Launching task {:?}", title);
                    self.go_to_state(VisualState::BackgroundApp);
                }
            }
            ControllerAction::DropItem(item) => info!("Dropped {:?}", item.title),
            ControllerAction::StartApp(exec) => {
                let item = ItemInfo::new(0, exec, exec, crate::model::Container::Desktop);
                self.start_activity_safely(&item);
            }
        }
    }
}
