//! Device geometry consumed by the launcher core
//!
//! Layout is decided elsewhere; this is only the handful of values the
//! controller selection and shelf computation read.

/// Current device layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub width_px: i32,
    pub height_px: i32,
    /// Height reserved for the hotseat row
    pub hotseat_bar_size_px: i32,
    pub is_tablet: bool,
    pub is_multi_window_mode: bool,
}

impl DeviceProfile {
    pub fn new(width_px: i32, height_px: i32, hotseat_bar_size_px: i32, is_tablet: bool) -> Self {
        Self {
            width_px,
            height_px,
            hotseat_bar_size_px,
            is_tablet,
            is_multi_window_mode: false,
        }
    }

    pub fn with_multi_window(mut self, multi_window: bool) -> Self {
        self.is_multi_window_mode = multi_window;
        self
    }

    pub fn is_landscape(&self) -> bool {
        self.width_px > self.height_px
    }

    /// Landscape phones move the hotseat and nav bar to the side of the screen
    pub fn is_vertical_bar_layout(&self) -> bool {
        self.is_landscape() && !self.is_tablet
    }

    /// Rotated copy of this profile (portrait <-> landscape)
    pub fn rotated(&self) -> Self {
        Self {
            width_px: self.height_px,
            height_px: self.width_px,
            ..self.clone()
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        // Typical 1080p phone in portrait
        Self::new(1080, 2340, 220, false)
    }
}
