//! Touch dispatch pass
//!
//! Follows one touch stream. Once the pointer leaves the slop region the
//! stream is offered to the controllers in registration order; the first
//! one to claim it owns the stream until release or cancel. A stream nobody
//! claims is not offered again.

use std::time::Instant;

use tracing::debug;

use super::controllers::{ControllerAction, ControllerContext, ControllerKind, ControllerSet, Release};
use super::gestures::{detect_edge, GestureConfig, Point, TouchIntent, TouchPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
enum StreamState {
    /// Still inside touch slop
    Pending,
    Claimed { index: usize, intent: TouchIntent },
    Unclaimed,
}

struct Stream {
    point: TouchPoint,
    state: StreamState,
}

/// Routes touch streams to the controller set
pub struct TouchDispatcher {
    config: GestureConfig,
    controllers: ControllerSet,
    stream: Option<Stream>,
}

impl TouchDispatcher {
    pub fn new(config: GestureConfig, controllers: ControllerSet) -> Self {
        Self {
            config,
            controllers,
            stream: None,
        }
    }

    pub fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    /// Swap in a rebuilt set; an in-flight stream is cancelled
    pub fn set_controllers(&mut self, controllers: ControllerSet) {
        self.touch_cancel();
        self.controllers = controllers;
    }

    /// Controller that owns the current stream
    pub fn active_controller(&self) -> Option<ControllerKind> {
        match self.stream.as_ref()?.state {
            StreamState::Claimed { index, .. } => self.controllers.kinds().get(index).copied(),
            _ => None,
        }
    }

    pub fn touch_down(&mut self, pos: Point, time: Instant) {
        if self.stream.is_some() {
            // A new stream replaces one we never saw end
            self.touch_cancel();
        }
        self.stream = Some(Stream {
            point: TouchPoint::new(pos, time),
            state: StreamState::Pending,
        });
    }

    /// Returns the progress (0.0..) of the claimed gesture, if any
    pub fn touch_motion(&mut self, pos: Point, time: Instant, ctx: &ControllerContext) -> Option<f64> {
        let stream = self.stream.as_mut()?;
        stream.point.update(pos, time);

        if stream.state == StreamState::Pending && stream.point.distance() >= self.config.touch_slop {
            let intent = TouchIntent {
                start: stream.point.start_pos,
                edge: detect_edge(&self.config, ctx.profile, stream.point.start_pos),
                direction: stream.point.direction(),
            };
            stream.state = match self.controllers.claim(&intent, ctx) {
                Some(index) => {
                    debug!(?intent, "Touch claimed by {:?}", self.controllers.kinds()[index]);
                    StreamState::Claimed { index, intent }
                }
                None => {
                    debug!(?intent, "Touch not claimed");
                    StreamState::Unclaimed
                }
            };
        }

        match stream.state {
            StreamState::Claimed { intent, .. } => {
                Some((stream.point.travel(intent.direction) / self.config.swipe_threshold).max(0.0))
            }
            _ => None,
        }
    }

    pub fn touch_up(&mut self) -> ControllerAction {
        let Some(stream) = self.stream.take() else {
            return ControllerAction::None;
        };
        let StreamState::Claimed { index, intent } = stream.state else {
            return ControllerAction::None;
        };

        let fling = stream.point.velocity_along(intent.direction) >= self.config.fling_velocity;
        let completed = fling
            || stream.point.travel(intent.direction) >= self.config.swipe_complete_threshold;
        let release = Release { intent, completed, fling };

        match self.controllers.get_mut(index) {
            Some(controller) => controller.on_release(&release),
            None => ControllerAction::None,
        }
    }

    pub fn touch_cancel(&mut self) {
        if let Some(Stream { state: StreamState::Claimed { index, .. }, .. }) = self.stream.take() {
            if let Some(controller) = self.controllers.get_mut(index) {
                controller.on_cancel();
            }
        }
    }
}
