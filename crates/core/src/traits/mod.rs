//! Platform-agnostic trait abstractions.
//!
//! The only platform service the core needs directly is a clock. Estimators
//! and actuators have their own traits next to the code that consumes them
//! ([`crate::pose::AttitudeEstimator`], [`crate::servo::ActuatorOutput`]).

pub mod time;

pub use time::{MockTime, TimeSource};
