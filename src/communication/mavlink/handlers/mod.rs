//! MAVLink Protocol Handlers
//!
//! Message-specific handlers for the tracker.
//!
//! # Handlers
//!
//! - **Tracking**: GLOBAL_POSITION_INT, SCALED_PRESSURE, MANUAL_CONTROL
//! - **Command Handler**: COMMAND_LONG, COMMAND_ACK
//! - **Parameter Handler**: PARAM_REQUEST_LIST, PARAM_REQUEST_READ, PARAM_SET
//! - **Telemetry Streamer**: HEARTBEAT, ATTITUDE, GLOBAL_POSITION_INT,
//!   NAV_CONTROLLER_OUTPUT, SERVO_OUTPUT_RAW, SYS_STATUS

pub mod command;
pub mod param;
pub mod telemetry;
pub mod tracking;

// Re-export commonly used types
pub use command::{CommandHandler, HomeRequest, TrackerCommand};
pub use param::ParamHandler;
pub use telemetry::{StreamRates, TelemetryStreamer};
pub use tracking::PressureReport;
