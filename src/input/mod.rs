//! Input handling - navigation mode, touch tracking, gesture controllers
//!
//! This module provides:
//! - The system navigation mode and where to read it from
//! - Touch stream tracking (slop, edge zones, direction)
//! - The ordered controller set and the dispatch pass over it

mod controllers;
mod dispatcher;
mod gestures;
mod navigation;

pub use controllers::*;
pub use dispatcher::*;
pub use gestures::*;
pub use navigation::*;
