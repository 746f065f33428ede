//! Tracker pose: estimator contract, built-in estimators and the per-tick
//! pose snapshot.

mod estimator;
mod fixed;
mod source;

pub use estimator::{select_index, Attitude, AttitudeEstimator, BaroReading, EstimatorKind};
pub use fixed::{ExternalPoseEstimator, ExternalSample, FixedPoseEstimator};
pub use source::{CalibrationError, TrackerPose};
