//! Launcher visual state and activity flags
//!
//! The [`StateManager`] is the authoritative holder of the current visual
//! state. It is shared on the UI thread (`Rc<RefCell<_>>`) between the
//! launcher and the controllers whose hooks need to read or feed it.

use std::fmt;
use std::time::Duration;

/// Top-level launcher mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    /// Home screen with app grid and hotseat
    Normal,
    /// App switcher
    Overview,
    AllApps,
    /// Workspace shrunk while dragging an item
    SpringLoaded,
    /// An app is in front of the launcher
    BackgroundApp,
    QuickSwitch,
}

impl VisualState {
    /// Whether the hotseat shelf is part of this state's layout
    pub fn shows_shelf(self) -> bool {
        matches!(self, VisualState::Normal | VisualState::Overview)
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VisualState::Normal => "normal",
            VisualState::Overview => "overview",
            VisualState::AllApps => "all-apps",
            VisualState::SpringLoaded => "spring-loaded",
            VisualState::BackgroundApp => "background-app",
            VisualState::QuickSwitch => "quick-switch",
        };
        f.write_str(name)
    }
}

/// Independent facts about the activity lifecycle
///
/// Used both for the current flags and for a set of changed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityFlags {
    pub started: bool,
    pub resumed: bool,
    pub deferred_resumed: bool,
    pub window_focused: bool,
    pub user_active: bool,
    pub transition_active: bool,
}

impl ActivityFlags {
    // Host platform bit layout
    pub const STARTED: u32 = 1 << 0;
    pub const RESUMED: u32 = 1 << 1;
    pub const DEFERRED_RESUMED: u32 = 1 << 2;
    pub const WINDOW_FOCUSED: u32 = 1 << 3;
    pub const USER_ACTIVE: u32 = 1 << 4;
    pub const TRANSITION_ACTIVE: u32 = 1 << 5;

    pub fn from_bits(bits: u32) -> Self {
        Self {
            started: bits & Self::STARTED != 0,
            resumed: bits & Self::RESUMED != 0,
            deferred_resumed: bits & Self::DEFERRED_RESUMED != 0,
            window_focused: bits & Self::WINDOW_FOCUSED != 0,
            user_active: bits & Self::USER_ACTIVE != 0,
            transition_active: bits & Self::TRANSITION_ACTIVE != 0,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.started { bits |= Self::STARTED; }
        if self.resumed { bits |= Self::RESUMED; }
        if self.deferred_resumed { bits |= Self::DEFERRED_RESUMED; }
        if self.window_focused { bits |= Self::WINDOW_FOCUSED; }
        if self.user_active { bits |= Self::USER_ACTIVE; }
        if self.transition_active { bits |= Self::TRANSITION_ACTIVE; }
        bits
    }

    /// Flags that differ between `self` and `other`
    pub fn changed_from(&self, other: &ActivityFlags) -> ActivityFlags {
        ActivityFlags::from_bits(self.bits() ^ other.bits())
    }

    /// Flags set in both
    pub fn intersect(&self, other: &ActivityFlags) -> ActivityFlags {
        ActivityFlags::from_bits(self.bits() & other.bits())
    }

    pub fn is_empty(&self) -> bool {
        self.bits() == 0
    }
}

/// Animation whose progress follows the user's finger
///
/// Playback lives elsewhere; the core only routes the handle to the slot
/// that owns the active animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationHandle {
    pub id: u64,
    pub duration: Duration,
    pub progress: f64,
}

impl AnimationHandle {
    pub fn new(id: u64, duration: Duration) -> Self {
        Self {
            id,
            duration,
            progress: 0.0,
        }
    }
}

/// Authoritative visual state plus the active user-controlled animation
#[derive(Debug)]
pub struct StateManager {
    state: VisualState,
    current_animation: Option<AnimationHandle>,
}

impl StateManager {
    pub fn new(state: VisualState) -> Self {
        Self {
            state,
            current_animation: None,
        }
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn is_in_state(&self, state: VisualState) -> bool {
        self.state == state
    }

    /// Record a finished transition; any user-controlled animation is done
    pub fn set_state(&mut self, state: VisualState) {
        if self.state != state {
            tracing::debug!("Visual state {} -> {}", self.state, state);
        }
        self.state = state;
        self.current_animation = None;
    }

    /// Take ownership of an animation driven by a touch controller
    pub fn set_current_user_controlled_animation(&mut self, animation: AnimationHandle) {
        if let Some(previous) = self.current_animation.replace(animation) {
            tracing::debug!("Replacing user-controlled animation {}", previous.id);
        }
    }

    pub fn current_animation(&self) -> Option<&AnimationHandle> {
        self.current_animation.as_ref()
    }

    pub fn current_animation_mut(&mut self) -> Option<&mut AnimationHandle> {
        self.current_animation.as_mut()
    }

    pub fn clear_current_animation(&mut self) -> Option<AnimationHandle> {
        self.current_animation.take()
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(VisualState::Normal)
    }
}
