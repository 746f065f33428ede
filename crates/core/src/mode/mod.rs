//! Control mode state machine
//!
//! # Contents
//!
//! - `ControlMode` / `ModeError`: mode identifiers and request errors
//! - `ModeHandler` trait with one stateless handler per mode, selected
//!   through a dispatch table indexed by the mode
//! - State types kept across ticks (scan sweep, guided target, inputs)
//! - `ModeStateMachine`: validated transitions, arming and per-tick dispatch

mod handlers;
mod machine;
mod state;
mod types;

pub use handlers::{handler_for, EntryContext, ModeHandler, ModeInputs, ModeOutput};
pub use machine::{ModeChange, ModeStateMachine, ModeStep};
pub use state::{
    AutoFallback, GuidedTarget, ManualInput, ModeData, ScanConfig, ScanState, Trims,
};
pub use types::{ControlMode, ModeError};
