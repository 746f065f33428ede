//! MAVLink protocol layer
//!
//! Converts between typed `MavMessage`s and tracker operations. Byte-level
//! framing is the link implementation's concern.
//!
//! # Components
//!
//! - [`link`]: Link abstraction and in-memory link
//! - [`router`]: Inbound routing, tracked system filter, GCS connection state
//! - [`handlers`]: Per-protocol message handlers
//! - [`state`]: Snapshot of tracker state used to build telemetry

pub mod handlers;
pub mod link;
pub mod router;
pub mod state;

pub use handlers::{CommandHandler, ParamHandler, TelemetryStreamer, TrackerCommand};
pub use link::{LinkError, MemoryLink, TelemetryLink};
pub use router::{ConnectionState, Inbound, MessageRouter, RouterStats};
pub use state::TrackerSnapshot;

/// System id used in outbound headers
pub const TRACKER_SYSTEM_ID: u8 = 1;

/// Component id used in outbound headers
pub const TRACKER_COMPONENT_ID: u8 = 1;
