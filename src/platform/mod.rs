//! Platform abstraction layer
//!
//! Host implementations of the collaborators the tracker consumes: the
//! monotonic clock here, in-memory actuators and storage in [`mock`].
//! Hardware ports provide their own implementations of the same traits.

pub mod mock;

use crate::communication::TelemetryLink;
use crate::home::HomeStore;
use antenna_tracker_core::servo::ActuatorOutput;
use antenna_tracker_core::traits::TimeSource;
use std::time::Instant;

/// Collaborator types a tracker is built from
///
/// Implementations pick concrete types at compile time; the tracker owns one
/// instance of each.
///
/// # Example
///
/// ```ignore
/// pub struct BenchPlatform;
///
/// impl Platform for BenchPlatform {
///     type Time = StdTime;
///     type Actuators = PcaServoBoard;
///     type HomeStore = EepromHome;
///     type Link = SerialLink;
/// }
/// ```
pub trait Platform {
    type Time: TimeSource;
    type Actuators: ActuatorOutput;
    type HomeStore: HomeStore;
    type Link: TelemetryLink;
}

/// Monotonic host clock, microseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct StdTime {
    start: Instant,
}

impl StdTime {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for StdTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StdTime {
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_time_is_monotonic() {
        let time = StdTime::new();
        let a = time.now_us();
        let b = time.now_us();
        assert!(b >= a);
        assert_eq!(time.elapsed_since(u64::MAX), 0);
    }
}
