//! Touch controllers and the ordered controller set
//!
//! Each controller recognizes one gesture family. The set is rebuilt from
//! scratch whenever the navigation mode, layout, multi-window state or the
//! overview-actions feature changes; registration order decides which
//! controller gets first refusal of a touch stream, so the list is never
//! patched in place.
//!
//! Claim rules are written so that, for a given mode and layout, no two
//! controllers in the same set claim the same (state, edge, direction).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};

use super::gestures::{Edge, Point, SwipeDirection, TouchIntent};
use super::navigation::NavigationMode;
use crate::device::DeviceProfile;
use crate::handlers::GestureHandler;
use crate::model::ItemInfo;
use crate::state::{AnimationHandle, StateManager, VisualState};

/// What a completed gesture asks the launcher to do
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerAction {
    None,
    GoToState(VisualState),
    /// Switch to the previous task
    QuickSwitch,
    OpenNotifications,
    /// Dismiss the task card under the touch start
    DismissTask { at: Point },
    /// Launch the task card under the touch start
    LaunchTask { at: Point },
    DropItem(ItemInfo),
    StartApp(String),
}

/// Launcher facts a controller may look at when offered a stream
#[derive(Debug, Clone, Copy)]
pub struct ControllerContext<'a> {
    pub state: VisualState,
    pub profile: &'a DeviceProfile,
}

impl ControllerContext<'_> {
    /// Edge the system navigation bar sits on
    pub fn nav_bar_edge(&self) -> Edge {
        if self.profile.is_vertical_bar_layout() {
            Edge::Right
        } else {
            Edge::Bottom
        }
    }
}

/// How a claimed stream ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub intent: TouchIntent,
    /// Travelled far enough, or flung
    pub completed: bool,
    pub fling: bool,
}

/// Identifies a controller in the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Drag,
    NoButtonQuickSwitch,
    NavBarToHome,
    NoButtonNavbarToOverview,
    FlingAndHold,
    OverviewToAllApps,
    LandscapeEdgeSwipe,
    TransposedQuickSwitch,
    PortraitStates { allow_drag_to_overview: bool },
    QuickSwitch,
    StatusBar,
    TaskView,
}

/// A recognizer that can claim and process a touch stream
pub trait TouchController {
    fn kind(&self) -> ControllerKind;

    /// Offered a stream that has moved past touch slop; true claims it
    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool;

    /// The claimed stream ended
    fn on_release(&mut self, release: &Release) -> ControllerAction;

    /// The claimed stream was cancelled
    fn on_cancel(&mut self) {}
}

/// Long-press-to-drag controller, shared with the code that starts drags
#[derive(Debug, Clone, Default)]
pub struct DragController {
    dragging: Rc<RefCell<Option<ItemInfo>>>,
}

impl DragController {
    pub fn start_drag(&self, item: ItemInfo) {
        debug!("Drag started for {:?}", item.title);
        *self.dragging.borrow_mut() = Some(item);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.borrow().is_some()
    }

    pub fn cancel_drag(&self) -> Option<ItemInfo> {
        self.dragging.borrow_mut().take()
    }
}

impl TouchController for DragController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Drag
    }

    // Only an in-progress drag claims; otherwise everything passes through
    fn on_intercept(&mut self, _intent: &TouchIntent, _ctx: &ControllerContext) -> bool {
        self.is_dragging()
    }

    fn on_release(&mut self, _release: &Release) -> ControllerAction {
        match self.cancel_drag() {
            Some(item) => ControllerAction::DropItem(item),
            None => ControllerAction::None,
        }
    }

    fn on_cancel(&mut self) {
        self.cancel_drag();
    }
}

/// Horizontal swipe along the gesture bar switches to the previous app
struct NoButtonQuickSwitchController;

impl TouchController for NoButtonQuickSwitchController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::NoButtonQuickSwitch
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(Edge::Bottom)
            && intent.direction.is_horizontal()
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed { ControllerAction::QuickSwitch } else { ControllerAction::None }
    }
}

/// Swipe up from the gesture bar returns home from any non-home state
struct NavBarToHomeController;

impl TouchController for NavBarToHomeController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::NavBarToHome
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state != VisualState::Normal
            && intent.edge == Some(Edge::Bottom)
            && intent.direction == SwipeDirection::Up
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed {
            ControllerAction::GoToState(VisualState::Normal)
        } else {
            ControllerAction::None
        }
    }
}

/// Swipe up from the gesture bar on home opens overview (overview actions)
struct NoButtonNavbarToOverviewController;

impl TouchController for NoButtonNavbarToOverviewController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::NoButtonNavbarToOverview
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(Edge::Bottom)
            && intent.direction == SwipeDirection::Up
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed {
            ControllerAction::GoToState(VisualState::Overview)
        } else {
            ControllerAction::None
        }
    }
}

/// Swipe up from the gesture bar on home: fling to all apps, hold for overview
struct FlingAndHoldController;

impl TouchController for FlingAndHoldController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::FlingAndHold
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(Edge::Bottom)
            && intent.direction == SwipeDirection::Up
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.fling {
            ControllerAction::GoToState(VisualState::AllApps)
        } else if release.completed {
            ControllerAction::GoToState(VisualState::Overview)
        } else {
            ControllerAction::None
        }
    }
}

/// Landscape phone: swipe up to all apps from home, or from the bottom of overview
struct OverviewToAllAppsController;

impl TouchController for OverviewToAllAppsController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::OverviewToAllApps
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        if intent.direction != SwipeDirection::Up {
            return false;
        }
        match ctx.state {
            VisualState::Normal => matches!(intent.edge, None | Some(Edge::Bottom)),
            VisualState::Overview => intent.edge == Some(Edge::Bottom),
            _ => false,
        }
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed {
            ControllerAction::GoToState(VisualState::AllApps)
        } else {
            ControllerAction::None
        }
    }
}

/// Landscape phone: swipe in from the nav bar side opens overview
struct LandscapeEdgeSwipeController;

impl TouchController for LandscapeEdgeSwipeController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::LandscapeEdgeSwipe
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(ctx.nav_bar_edge())
            && intent.direction == SwipeDirection::Left
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed {
            ControllerAction::GoToState(VisualState::Overview)
        } else {
            ControllerAction::None
        }
    }
}

/// Landscape phone: swipe along the side nav bar switches apps
struct TransposedQuickSwitchController;

impl TouchController for TransposedQuickSwitchController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::TransposedQuickSwitch
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        matches!(ctx.state, VisualState::Normal | VisualState::Overview)
            && intent.edge == Some(ctx.nav_bar_edge())
            && intent.direction.is_vertical()
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed { ControllerAction::QuickSwitch } else { ControllerAction::None }
    }
}

/// Portrait vertical swipes between home, all apps and (optionally) overview
struct PortraitStatesController {
    allow_drag_to_overview: bool,
    target: Option<VisualState>,
}

impl TouchController for PortraitStatesController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::PortraitStates {
            allow_drag_to_overview: self.allow_drag_to_overview,
        }
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        self.target = match (ctx.state, intent.direction, intent.edge) {
            (VisualState::Normal, SwipeDirection::Up, None) => Some(VisualState::AllApps),
            (VisualState::Normal, SwipeDirection::Up, Some(Edge::Bottom))
                if self.allow_drag_to_overview =>
            {
                Some(VisualState::Overview)
            }
            (VisualState::AllApps, SwipeDirection::Down, edge) if edge != Some(Edge::Top) => {
                Some(VisualState::Normal)
            }
            _ => None,
        };
        self.target.is_some()
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        match self.target.take() {
            Some(target) if release.completed => ControllerAction::GoToState(target),
            _ => ControllerAction::None,
        }
    }

    fn on_cancel(&mut self) {
        self.target = None;
    }
}

/// Two-button mode: horizontal swipe on the home pill switches apps
struct QuickSwitchController;

impl TouchController for QuickSwitchController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::QuickSwitch
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(Edge::Bottom)
            && intent.direction.is_horizontal()
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed { ControllerAction::QuickSwitch } else { ControllerAction::None }
    }
}

/// Swipe down from the top of home runs the configured handler
struct StatusBarController {
    handler: GestureHandler,
}

impl TouchController for StatusBarController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::StatusBar
    }

    fn on_intercept(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> bool {
        ctx.state == VisualState::Normal
            && intent.edge == Some(Edge::Top)
            && intent.direction == SwipeDirection::Down
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if release.completed {
            debug!("Status bar pull-down: {}", self.handler.display_name());
            self.handler.on_gesture_trigger()
        } else {
            ControllerAction::None
        }
    }
}

/// Behaviour the task-view controller borrows from its host
pub struct TaskViewHooks {
    /// True while task cards accept swipes
    pub is_recents_interactive: Box<dyn Fn() -> bool>,
    /// Receives the animation created when a swipe on a card starts
    pub on_user_controlled_animation_created: Box<dyn FnMut(AnimationHandle)>,
}

impl TaskViewHooks {
    /// Recents are interactive in overview; animations go to the state manager
    pub fn for_state_manager(state_manager: &Rc<RefCell<StateManager>>) -> Self {
        let reader = state_manager.clone();
        let writer = state_manager.clone();
        Self {
            is_recents_interactive: Box::new(move || {
                reader.borrow().is_in_state(VisualState::Overview)
            }),
            on_user_controlled_animation_created: Box::new(move |animation| {
                writer.borrow_mut().set_current_user_controlled_animation(animation);
            }),
        }
    }
}

/// Vertical swipes on task cards: up dismisses, down launches
struct TaskViewController {
    hooks: TaskViewHooks,
    animations_created: u64,
}

const TASK_SWIPE_DURATION: Duration = Duration::from_millis(300);

impl TouchController for TaskViewController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::TaskView
    }

    fn on_intercept(&mut self, intent: &TouchIntent, _ctx: &ControllerContext) -> bool {
        if intent.edge.is_some() || !intent.direction.is_vertical() {
            return false;
        }
        if !(self.hooks.is_recents_interactive)() {
            return false;
        }

        self.animations_created += 1;
        let animation = AnimationHandle::new(self.animations_created, TASK_SWIPE_DURATION);
        (self.hooks.on_user_controlled_animation_created)(animation);
        true
    }

    fn on_release(&mut self, release: &Release) -> ControllerAction {
        if !release.completed {
            return ControllerAction::None;
        }
        match release.intent.direction {
            SwipeDirection::Up => ControllerAction::DismissTask { at: release.intent.start },
            SwipeDirection::Down => ControllerAction::LaunchTask { at: release.intent.start },
            _ => ControllerAction::None,
        }
    }
}

/// Inputs that decide which controllers are registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerParams {
    pub mode: NavigationMode,
    pub is_vertical_layout: bool,
    pub is_multi_window: bool,
    pub overview_actions_enabled: bool,
}

/// Ordered controllers; earlier entries get first refusal
pub struct ControllerSet {
    params: ControllerParams,
    controllers: Vec<Box<dyn TouchController>>,
}

impl ControllerSet {
    pub fn params(&self) -> ControllerParams {
        self.params
    }

    pub fn kinds(&self) -> Vec<ControllerKind> {
        self.controllers.iter().map(|c| c.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut (dyn TouchController + 'static)> {
        self.controllers.get_mut(index).map(|c| c.as_mut())
    }

    /// Offer a stream in registration order; index of the claimer
    pub(crate) fn claim(&mut self, intent: &TouchIntent, ctx: &ControllerContext) -> Option<usize> {
        self.controllers
            .iter_mut()
            .position(|controller| controller.on_intercept(intent, ctx))
    }
}

impl fmt::Debug for ControllerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSet")
            .field("params", &self.params)
            .field("controllers", &self.kinds())
            .finish()
    }
}

/// Build the controller set for the given mode and layout
pub fn build_controllers(
    params: ControllerParams,
    drag: DragController,
    task_view_hooks: TaskViewHooks,
    swipe_down_handler: GestureHandler,
) -> ControllerSet {
    let mode = params.mode;
    let mut list: Vec<Box<dyn TouchController>> = vec![Box::new(drag)];

    if mode == NavigationMode::NO_BUTTON {
        list.push(Box::new(NoButtonQuickSwitchController));
        list.push(Box::new(NavBarToHomeController));
        if params.overview_actions_enabled {
            list.push(Box::new(NoButtonNavbarToOverviewController));
        } else {
            list.push(Box::new(FlingAndHoldController));
        }
    } else if params.is_vertical_layout {
        list.push(Box::new(OverviewToAllAppsController));
        list.push(Box::new(LandscapeEdgeSwipeController));
        if mode.has_gestures() {
            list.push(Box::new(TransposedQuickSwitchController));
        }
    } else {
        list.push(Box::new(PortraitStatesController {
            allow_drag_to_overview: mode.has_gestures(),
            target: None,
        }));
        if mode.has_gestures() {
            list.push(Box::new(QuickSwitchController));
        }
    }

    if !params.is_multi_window {
        list.push(Box::new(StatusBarController { handler: swipe_down_handler }));
    }

    list.push(Box::new(TaskViewController {
        hooks: task_view_hooks,
        animations_created: 0,
    }));

    let set = ControllerSet { params, controllers: list };
    info!(mode = %mode, vertical = params.is_vertical_layout, "Touch controllers: {:?}", set.kinds());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use ControllerKind::*;

    fn hooks_with(interactive: Rc<Cell<bool>>) -> TaskViewHooks {
        TaskViewHooks {
            is_recents_interactive: Box::new(move || interactive.get()),
            on_user_controlled_animation_created: Box::new(|_| {}),
        }
    }

    fn build(params: ControllerParams) -> ControllerSet {
        build_controllers(
            params,
            DragController::default(),
            hooks_with(Rc::new(Cell::new(false))),
            GestureHandler::default(),
        )
    }

    fn params(
        mode: NavigationMode,
        is_vertical_layout: bool,
        is_multi_window: bool,
        overview_actions_enabled: bool,
    ) -> ControllerParams {
        ControllerParams { mode, is_vertical_layout, is_multi_window, overview_actions_enabled }
    }

    fn all_params() -> Vec<ControllerParams> {
        let mut out = Vec::new();
        for mode in [
            NavigationMode::THREE_BUTTONS,
            NavigationMode::TWO_BUTTONS,
            NavigationMode::NO_BUTTON,
        ] {
            for vertical in [false, true] {
                for multi_window in [false, true] {
                    for overview_actions in [false, true] {
                        out.push(params(mode, vertical, multi_window, overview_actions));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_drag_first_task_view_last() {
        for p in all_params() {
            let kinds = build(p).kinds();
            assert_eq!(kinds.first(), Some(&Drag), "{:?}", p);
            assert_eq!(kinds.last(), Some(&TaskView), "{:?}", p);

            let overview_variants = kinds
                .iter()
                .filter(|k| matches!(k, NoButtonNavbarToOverview | FlingAndHold))
                .count();
            if p.mode == NavigationMode::NO_BUTTON {
                assert_eq!(overview_variants, 1, "{:?}", p);
            } else {
                assert_eq!(overview_variants, 0, "{:?}", p);
            }

            assert_eq!(kinds.contains(&StatusBar), !p.is_multi_window, "{:?}", p);
        }
    }

    #[test]
    fn test_no_button_sequence() {
        let set = build(params(NavigationMode::NO_BUTTON, false, true, false));
        assert_eq!(set.kinds(), vec![Drag, NoButtonQuickSwitch, NavBarToHome, FlingAndHold, TaskView]);

        let set = build(params(NavigationMode::NO_BUTTON, false, false, true));
        assert_eq!(
            set.kinds(),
            vec![Drag, NoButtonQuickSwitch, NavBarToHome, NoButtonNavbarToOverview, StatusBar, TaskView]
        );
    }

    #[test]
    fn test_no_button_ignores_vertical_layout() {
        let portrait = build(params(NavigationMode::NO_BUTTON, false, false, false)).kinds();
        let landscape = build(params(NavigationMode::NO_BUTTON, true, false, false)).kinds();
        assert_eq!(portrait, landscape);
        assert!(!landscape.contains(&OverviewToAllApps));
        assert!(!landscape.contains(&LandscapeEdgeSwipe));
    }

    #[test]
    fn test_vertical_button_sequence() {
        let set = build(params(NavigationMode::TWO_BUTTONS, true, true, false));
        assert_eq!(
            set.kinds(),
            vec![Drag, OverviewToAllApps, LandscapeEdgeSwipe, TransposedQuickSwitch, TaskView]
        );

        let set = build(params(NavigationMode::THREE_BUTTONS, true, true, false));
        assert_eq!(set.kinds(), vec![Drag, OverviewToAllApps, LandscapeEdgeSwipe, TaskView]);
    }

    #[test]
    fn test_minimal_sequence() {
        let set = build(params(NavigationMode::THREE_BUTTONS, false, true, false));
        assert_eq!(
            set.kinds(),
            vec![Drag, PortraitStates { allow_drag_to_overview: false }, TaskView]
        );

        let set = build(params(NavigationMode::TWO_BUTTONS, false, false, false));
        assert_eq!(
            set.kinds(),
            vec![Drag, PortraitStates { allow_drag_to_overview: true }, QuickSwitch, StatusBar, TaskView]
        );
    }

    #[test]
    fn test_at_most_one_claimer() {
        let states = [
            VisualState::Normal,
            VisualState::Overview,
            VisualState::AllApps,
            VisualState::SpringLoaded,
            VisualState::BackgroundApp,
            VisualState::QuickSwitch,
        ];
        let edges = [None, Some(Edge::Left), Some(Edge::Right), Some(Edge::Top), Some(Edge::Bottom)];
        let directions = [
            SwipeDirection::Up,
            SwipeDirection::Down,
            SwipeDirection::Left,
            SwipeDirection::Right,
        ];

        for p in all_params() {
            let profile = if p.is_vertical_layout {
                DeviceProfile::default().rotated()
            } else {
                DeviceProfile::default()
            };
            let interactive = Rc::new(Cell::new(false));
            let mut set = build_controllers(
                p,
                DragController::default(),
                hooks_with(interactive.clone()),
                GestureHandler::default(),
            );

            for state in states {
                interactive.set(state == VisualState::Overview);
                let ctx = ControllerContext { state, profile: &profile };
                for edge in edges {
                    for direction in directions {
                        let intent = TouchIntent { start: Point::new(500.0, 500.0), edge, direction };
                        let claimers: Vec<_> = set
                            .controllers
                            .iter_mut()
                            .filter_map(|c| c.on_intercept(&intent, &ctx).then(|| c.kind()))
                            .collect();
                        assert!(
                            claimers.len() <= 1,
                            "{:?} {:?} {:?} {:?}: {:?}",
                            p, state, edge, direction, claimers
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_active_drag_claims_first() {
        let drag = DragController::default();
        let mut set = build_controllers(
            params(NavigationMode::NO_BUTTON, false, false, false),
            drag.clone(),
            hooks_with(Rc::new(Cell::new(false))),
            GestureHandler::default(),
        );
        let profile = DeviceProfile::default();
        let ctx = ControllerContext { state: VisualState::Normal, profile: &profile };
        let intent = TouchIntent {
            start: Point::new(540.0, 2300.0),
            edge: Some(Edge::Bottom),
            direction: SwipeDirection::Up,
        };

        assert_eq!(set.claim(&intent, &ctx), Some(3)); // fling-and-hold

        drag.start_drag(ItemInfo::new(1, "XTerm", "xterm", crate::model::Container::Desktop));
        assert_eq!(set.claim(&intent, &ctx), Some(0));
    }

    #[test]
    fn test_task_view_hands_off_animation() {
        let state_manager = Rc::new(RefCell::new(StateManager::new(VisualState::Overview)));
        let mut set = build_controllers(
            params(NavigationMode::NO_BUTTON, false, false, false),
            DragController::default(),
            TaskViewHooks::for_state_manager(&state_manager),
            GestureHandler::default(),
        );
        let profile = DeviceProfile::default();
        let ctx = ControllerContext { state: VisualState::Overview, profile: &profile };
        let intent = TouchIntent {
            start: Point::new(540.0, 600.0),
            edge: None,
            direction: SwipeDirection::Up,
        };

        let index = set.claim(&intent, &ctx);
        assert_eq!(index.map(|i| set.kinds()[i]), Some(TaskView));
        assert!(state_manager.borrow().current_animation().is_some());

        // Not interactive outside overview
        state_manager.borrow_mut().set_state(VisualState::Normal);
        assert_eq!(set.claim(&intent, &ctx), None);
        assert!(state_manager.borrow().current_animation().is_none());
    }
}
