//! Parameter management types and utilities
//!
//! This module provides the parameter store and the typed parameter blocks
//! that read from it. Saving and loading the store is done by the platform.

pub mod error;
pub mod servo;
pub mod storage;
pub mod tracker;

pub use error::ParameterError;
pub use servo::ServoParams;
pub use storage::{
    load_bool, load_float, load_int, ParamFlags, ParamValue, ParameterStore, MAX_PARAMS,
    PARAM_NAME_LEN,
};
pub use tracker::{AltSource, TrackerParams};
