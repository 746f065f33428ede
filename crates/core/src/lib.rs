//! antenna_tracker_core - Pure no_std tracking logic for the antenna tracker
//!
//! This crate contains the platform-agnostic part of the tracker: everything
//! that turns telemetry reports and the tracker's own pose into servo pulse
//! widths, plus the cooperative scheduler that runs it at a fixed rate.
//! It can be tested on host without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library or allocator dependencies
//! - **Trait abstractions**: Clocks, estimators and actuators injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Time source abstraction
//! - [`navigation`]: Fixed-point locations and the geometry calculator
//! - [`vehicle`]: Vehicle position estimator (dead reckoning)
//! - [`pose`]: Tracker pose adapter over an attitude estimator
//! - [`mode`]: Control mode state machine and its dispatch table
//! - [`servo`]: Servo command generator and actuator abstraction
//! - [`scheduler`]: Fixed-rate cooperative task scheduler
//! - [`parameters`]: Parameter store and typed parameter blocks

#![no_std]

pub mod mode;
pub mod navigation;
pub mod parameters;
pub mod pose;
pub mod scheduler;
pub mod servo;
pub mod traits;
pub mod vehicle;
