//! Tracker error type
//!
//! Wraps the core errors together with the errors of the collaborators this
//! crate talks to (home storage, telemetry link).

use crate::communication::LinkError;
use crate::home::StorageError;
use antenna_tracker_core::mode::ModeError;
use antenna_tracker_core::parameters::ParameterError;
use antenna_tracker_core::pose::CalibrationError;
use antenna_tracker_core::scheduler::SchedulerError;
use antenna_tracker_core::vehicle::TrackingError;

/// Errors reported by tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Mode change rejected: {0}")]
    Mode(ModeError),

    #[error("Position report rejected: {0}")]
    Tracking(TrackingError),

    #[error("Altitude calibration failed: {0}")]
    Calibration(CalibrationError),

    #[error("Parameter error: {0}")]
    Parameter(ParameterError),

    #[error("Scheduler setup failed: {0}")]
    Scheduler(SchedulerError),

    #[error("Home storage failed: {0}")]
    HomeStorage(#[from] StorageError),

    #[error("Telemetry link failed: {0}")]
    Link(#[from] LinkError),

    #[error("Invalid servo request: {0}")]
    InvalidServo(&'static str),

    #[error("Home location is not plausible")]
    InvalidHome,

    #[error("No attitude estimator registered")]
    NoEstimator,

    #[error("No local barometer reading")]
    NoBarometer,
}

impl From<ModeError> for TrackerError {
    fn from(err: ModeError) -> Self {
        TrackerError::Mode(err)
    }
}

impl From<TrackingError> for TrackerError {
    fn from(err: TrackingError) -> Self {
        TrackerError::Tracking(err)
    }
}

impl From<CalibrationError> for TrackerError {
    fn from(err: CalibrationError) -> Self {
        TrackerError::Calibration(err)
    }
}

impl From<ParameterError> for TrackerError {
    fn from(err: ParameterError) -> Self {
        TrackerError::Parameter(err)
    }
}

impl From<SchedulerError> for TrackerError {
    fn from(err: SchedulerError) -> Self {
        TrackerError::Scheduler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_core_error() {
        let err: TrackerError = ModeError::HomeNotSet.into();
        assert_eq!(err.to_string(), "Mode change rejected: home not set");
    }

    #[test]
    fn test_storage_error_converts() {
        let err: TrackerError = StorageError::WriteFailed.into();
        assert!(matches!(err, TrackerError::HomeStorage(StorageError::WriteFailed)));
    }
}
