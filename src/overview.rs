//! Overview surface - recent tasks as a vertical card stack
//!
//! Only what the gesture core needs: card hit-testing for the task-view
//! controller, and the "swipe down launches app" switch.

use crate::device::DeviceProfile;
use crate::input::Point;

/// Capability the state coordinator drives on the overview surface
pub trait OverviewPanel {
    fn set_swipe_down_should_launch_app(&mut self, enabled: bool);
}

/// Recent task shown as a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub id: u32,
    pub title: String,
    pub app_class: String,
}

impl TaskCard {
    pub fn new(id: u32, title: &str, app_class: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            app_class: app_class.to_string(),
        }
    }
}

/// Card geometry
#[derive(Debug, Clone)]
pub struct CardLayout {
    width_px: f64,
    height_px: f64,
    /// Card height as fraction of screen
    card_height_ratio: f64,
    /// Vertical distance between card tops
    card_spacing: f64,
    side_margin: f64,
    top_offset: f64,
}

impl CardLayout {
    pub fn new(profile: &DeviceProfile) -> Self {
        Self {
            width_px: profile.width_px as f64,
            height_px: profile.height_px as f64,
            card_height_ratio: 0.55, // 55% of screen height
            card_spacing: 180.0,     // Overlap amount
            side_margin: 16.0,
            top_offset: 80.0,        // Below header
        }
    }

    /// (x, y, width, height) of the card at `index`
    pub fn card_rect(&self, index: usize, scroll_offset: f64) -> (f64, f64, f64, f64) {
        let card_width = self.width_px - (self.side_margin * 2.0);
        let card_height = self.height_px * self.card_height_ratio;
        let y = self.top_offset + (index as f64 * self.card_spacing) - scroll_offset;

        (self.side_margin, y, card_width, card_height)
    }
}

/// Recents surface state
#[derive(Debug, Clone)]
pub struct RecentsView {
    pub tasks: Vec<TaskCard>,
    pub layout: CardLayout,
    pub scroll_offset: f64,
    swipe_down_should_launch_app: bool,
}

impl RecentsView {
    pub fn new(profile: &DeviceProfile) -> Self {
        Self {
            tasks: Vec::new(),
            layout: CardLayout::new(profile),
            scroll_offset: 0.0,
            swipe_down_should_launch_app: true,
        }
    }

    pub fn on_device_profile_changed(&mut self, profile: &DeviceProfile) {
        self.layout = CardLayout::new(profile);
    }

    pub fn swipe_down_should_launch_app(&self) -> bool {
        self.swipe_down_should_launch_app
    }

    /// Topmost card under `pos`; later cards overlap earlier ones
    pub fn task_at(&self, pos: Point) -> Option<&TaskCard> {
        self.tasks.iter().enumerate().rev().find_map(|(index, task)| {
            let (x, y, w, h) = self.layout.card_rect(index, self.scroll_offset);
            let hit = pos.x >= x && pos.x < x + w && pos.y >= y && pos.y < y + h;
            hit.then_some(task)
        })
    }

    pub fn remove_task(&mut self, id: u32) -> Option<TaskCard> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }
}

impl OverviewPanel for RecentsView {
    fn set_swipe_down_should_launch_app(&mut self, enabled: bool) {
        self.swipe_down_should_launch_app = enabled;
    }
}
