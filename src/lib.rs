//! Flick launcher core
//!
//! The part of the home screen that decides which touch gestures are live
//! and keeps the system shelf and hotseat predictions in step with the
//! launcher lifecycle:
//! - Controller set composition per navigation mode and layout
//! - Touch dispatch over the ordered controller set
//! - Shelf visibility pushed through a latest-wins background dispatcher
//! - Optional hotseat prediction lifecycle

pub mod config;
pub mod coordinator;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod input;
pub mod launcher;
pub mod model;
pub mod overview;
pub mod prediction;
pub mod state;

pub use config::LauncherConfig;
pub use error::{Error, Result};
pub use launcher::Launcher;
