//! Communication Protocols
//!
//! The tracker talks MAVLink 2.0 to both the tracked vehicle and the ground
//! control station over one link.
//!
//! - Inbound: vehicle position and pressure reports, operator input,
//!   mode changes, commands and parameter requests
//! - Outbound: status telemetry, command acknowledgements, parameter values

pub mod mavlink;

pub use self::mavlink::link::{LinkError, MemoryLink, TelemetryLink};
