//! Attitude estimator contract
//!
//! The tracker does not fuse sensors itself. It consumes the output of one
//! estimator chosen at startup through the `AHRS_TYPE` parameter.

use crate::navigation::{wrap_360, Location};
use nalgebra::UnitQuaternion;

/// Estimator strategy identifier (value of `AHRS_TYPE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EstimatorKind {
    /// Direction-cosine-matrix filter
    Dcm = 0,
    /// Extended Kalman filter
    Ekf = 1,
    /// Surveyed site with fixed attitude and location
    Fixed = 2,
}

impl EstimatorKind {
    /// Map a parameter value to a kind, `None` for unknown values
    pub fn from_param(value: i32) -> Option<Self> {
        match value {
            0 => Some(EstimatorKind::Dcm),
            1 => Some(EstimatorKind::Ekf),
            2 => Some(EstimatorKind::Fixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::Dcm => "DCM",
            EstimatorKind::Ekf => "EKF",
            EstimatorKind::Fixed => "FIXED",
        }
    }
}

/// Tracker body attitude (NED, ZYX Euler convention)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub quaternion: UnitQuaternion<f32>,
}

impl Default for Attitude {
    fn default() -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
        }
    }
}

impl Attitude {
    /// Build from Euler angles in degrees
    pub fn from_euler_deg(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            quaternion: UnitQuaternion::from_euler_angles(
                roll.to_radians(),
                pitch.to_radians(),
                yaw.to_radians(),
            ),
        }
    }

    pub fn roll_deg(&self) -> f32 {
        self.quaternion.euler_angles().0.to_degrees()
    }

    pub fn pitch_deg(&self) -> f32 {
        self.quaternion.euler_angles().1.to_degrees()
    }

    /// Heading in `[0, 360)`
    pub fn yaw_deg(&self) -> f32 {
        wrap_360(self.quaternion.euler_angles().2.to_degrees())
    }
}

/// One barometer sample from the tracker's own sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroReading {
    /// Absolute pressure, Pa
    pub pressure_pa: f32,
    /// Ambient temperature, °C
    pub temperature_c: f32,
    /// Barometric altitude, meters
    pub altitude_m: f32,
}

/// Attitude/position estimator consumed by the tracker pose source.
pub trait AttitudeEstimator {
    /// Strategy identifier used for startup selection
    fn kind(&self) -> EstimatorKind;

    /// Advance the estimator to `now_us`
    fn update(&mut self, now_us: u64);

    /// Current body attitude
    fn attitude(&self) -> Attitude;

    /// Own position, `None` without a fix
    fn position(&self) -> Option<Location>;

    /// Latest barometer sample, `None` without a barometer
    fn baro(&self) -> Option<BaroReading>;

    /// True when the outputs can be trusted
    fn is_healthy(&self) -> bool;
}

/// Index of the estimator matching `preferred`, else the first registered one.
pub fn select_index(preferred: EstimatorKind, kinds: &[EstimatorKind]) -> Option<usize> {
    kinds
        .iter()
        .position(|kind| *kind == preferred)
        .or(if kinds.is_empty() { None } else { Some(0) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attitude_euler_round_trip_degrees() {
        let att = Attitude::from_euler_deg(2.0, -5.0, 270.0);
        assert!((att.roll_deg() - 2.0).abs() < 0.01);
        assert!((att.pitch_deg() + 5.0).abs() < 0.01);
        assert!((att.yaw_deg() - 270.0).abs() < 0.01);
    }

    #[test]
    fn select_prefers_matching_kind() {
        let kinds = [EstimatorKind::Fixed, EstimatorKind::Ekf];
        assert_eq!(select_index(EstimatorKind::Ekf, &kinds), Some(1));
        assert_eq!(select_index(EstimatorKind::Dcm, &kinds), Some(0));
        assert_eq!(select_index(EstimatorKind::Dcm, &[]), None);
    }

    #[test]
    fn kind_from_param() {
        assert_eq!(EstimatorKind::from_param(2), Some(EstimatorKind::Fixed));
        assert_eq!(EstimatorKind::from_param(7), None);
    }
}
