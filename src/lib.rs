//! antenna_tracker - Ground antenna tracker
//!
//! Follows a remote vehicle over MAVLink and points a two-axis servo mount at
//! it. The tracking logic itself lives in `antenna_tracker_core`; this crate
//! wires it to the outside world: telemetry link, home storage, actuators and
//! the scheduler task table.

// Logging macros (must come first so other modules can use them)
#[macro_use]
pub mod logging;

pub mod communication;
pub mod error;
pub mod home;
pub mod platform;
pub mod tasks;
pub mod tracker;

pub use error::TrackerError;
pub use tracker::{Tracker, TrackerIo};
