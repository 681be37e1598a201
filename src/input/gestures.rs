//! Touch tracking for a single gesture stream
//!
//! A stream starts with touch down, follows one pointer, and resolves into a
//! [`TouchIntent`] once the pointer has moved past touch slop. The intent is
//! what controllers inspect when deciding whether to claim the stream.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::device::DeviceProfile;

/// Point in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Edge of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Direction of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn is_vertical(self) -> bool {
        matches!(self, SwipeDirection::Up | SwipeDirection::Down)
    }

    pub fn is_horizontal(self) -> bool {
        !self.is_vertical()
    }
}

/// Thresholds for touch recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Width of edge detection zone in pixels
    pub edge_threshold: f64,

    /// Distance the pointer must travel before a controller is asked to claim
    pub touch_slop: f64,

    /// Distance mapped to a progress of 1.0
    pub swipe_threshold: f64,

    /// Distance required to complete a claimed gesture
    pub swipe_complete_threshold: f64,

    /// Release velocity (px/s) above which a swipe counts as a fling
    pub fling_velocity: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 80.0,  // 80px edge zone for easier touch on phone screens
            touch_slop: 30.0,
            swipe_threshold: 300.0,
            swipe_complete_threshold: 100.0,
            fling_velocity: 500.0,
        }
    }
}

/// What a touch stream looks like once it has left the slop region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchIntent {
    pub start: Point,
    /// Edge zone the touch started in, if any
    pub edge: Option<Edge>,
    pub direction: SwipeDirection,
}

/// Touch point tracking
#[derive(Debug, Clone)]
pub struct TouchPoint {
    pub start_pos: Point,
    pub current_pos: Point,
    pub start_time: Instant,
    pub last_time: Instant,
    /// Pixels per second
    pub velocity: Point,
}

impl TouchPoint {
    pub fn new(pos: Point, time: Instant) -> Self {
        Self {
            start_pos: pos,
            current_pos: pos,
            start_time: time,
            last_time: time,
            velocity: Point::default(),
        }
    }

    pub fn update(&mut self, pos: Point, time: Instant) {
        let dt = time.saturating_duration_since(self.last_time).as_secs_f64();

        if dt > 0.001 {
            self.velocity = Point::new(
                (pos.x - self.current_pos.x) / dt,
                (pos.y - self.current_pos.y) / dt,
            );
        }

        self.current_pos = pos;
        self.last_time = time;
    }

    pub fn delta(&self) -> Point {
        Point::new(
            self.current_pos.x - self.start_pos.x,
            self.current_pos.y - self.start_pos.y,
        )
    }

    pub fn distance(&self) -> f64 {
        let d = self.delta();
        (d.x * d.x + d.y * d.y).sqrt()
    }

    /// Dominant direction of travel so far
    pub fn direction(&self) -> SwipeDirection {
        let d = self.delta();
        if d.y.abs() >= d.x.abs() {
            if d.y < 0.0 { SwipeDirection::Up } else { SwipeDirection::Down }
        } else if d.x < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        }
    }

    /// Distance travelled along `direction` (negative when moving against it)
    pub fn travel(&self, direction: SwipeDirection) -> f64 {
        let d = self.delta();
        match direction {
            SwipeDirection::Up => -d.y,
            SwipeDirection::Down => d.y,
            SwipeDirection::Left => -d.x,
            SwipeDirection::Right => d.x,
        }
    }

    /// Velocity along `direction`
    pub fn velocity_along(&self, direction: SwipeDirection) -> f64 {
        match direction {
            SwipeDirection::Up => -self.velocity.y,
            SwipeDirection::Down => self.velocity.y,
            SwipeDirection::Left => -self.velocity.x,
            SwipeDirection::Right => self.velocity.x,
        }
    }
}

/// Check if a point is in an edge zone
pub fn detect_edge(config: &GestureConfig, profile: &DeviceProfile, pos: Point) -> Option<Edge> {
    let threshold = config.edge_threshold;
    let w = profile.width_px as f64;
    let h = profile.height_px as f64;

    if pos.y > h - threshold {
        Some(Edge::Bottom)
    } else if pos.y < threshold {
        Some(Edge::Top)
    } else if pos.x < threshold {
        Some(Edge::Left)
    } else if pos.x > w - threshold {
        Some(Edge::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_edge_detection() {
        let config = GestureConfig::default();
        let profile = DeviceProfile::new(1080, 2340, 200, false);

        assert_eq!(detect_edge(&config, &profile, Point::new(540.0, 2300.0)), Some(Edge::Bottom));
        assert_eq!(detect_edge(&config, &profile, Point::new(540.0, 10.0)), Some(Edge::Top));
        assert_eq!(detect_edge(&config, &profile, Point::new(10.0, 1000.0)), Some(Edge::Left));
        assert_eq!(detect_edge(&config, &profile, Point::new(1070.0, 1000.0)), Some(Edge::Right));
        assert_eq!(detect_edge(&config, &profile, Point::new(540.0, 1000.0)), None);
    }

    #[test]
    fn test_direction_and_travel() {
        let t0 = Instant::now();
        let mut point = TouchPoint::new(Point::new(500.0, 1000.0), t0);
        point.update(Point::new(510.0, 880.0), t0 + Duration::from_millis(100));

        assert_eq!(point.direction(), SwipeDirection::Up);
        assert!((point.travel(SwipeDirection::Up) - 120.0).abs() < 0.001);
        // 120px in 100ms
        assert!((point.velocity_along(SwipeDirection::Up) - 1200.0).abs() < 0.001);
    }
}
