//! Tracker pose source
//!
//! Snapshot of the tracker's own location, heading and altitude taken from
//! the selected estimator once per tick, plus the altitude calibration
//! offset that lines the tracker's altitude up with the vehicle's.

use super::estimator::{Attitude, AttitudeEstimator, BaroReading};
use crate::navigation::Location;
use crate::vehicle::VehicleState;

/// Gas constant over gravity times lapse rate, for the hypsometric formula
const BARO_SCALE: f32 = 153.8462;
/// Exponent R·L/(g·M) of the standard atmosphere
const BARO_EXPONENT: f32 = 0.190_259;

/// Altitude calibration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// No valid vehicle location to calibrate against
    VehicleNotValid,
}

impl CalibrationError {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationError::VehicleNotValid => "vehicle location not valid",
        }
    }
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tick view of the tracker's own pose
#[derive(Debug, Clone, Default)]
pub struct TrackerPose {
    location: Location,
    has_fix: bool,
    healthy: bool,
    attitude: Attitude,
    baro: Option<BaroReading>,
    altitude_offset: f32,
}

impl TrackerPose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the estimator outputs.
    ///
    /// Without a position fix the location falls back to `home`; with
    /// neither, the previous location is kept.
    pub fn refresh(&mut self, estimator: &dyn AttitudeEstimator, home: Option<Location>) {
        self.attitude = estimator.attitude();
        self.baro = estimator.baro();
        self.healthy = estimator.is_healthy();
        match estimator.position() {
            Some(location) => {
                self.location = location;
                self.has_fix = true;
            }
            None => {
                self.has_fix = false;
                if let Some(home) = home {
                    self.location = home;
                }
            }
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// True when the last refresh had a position fix of its own
    pub fn has_position_fix(&self) -> bool {
        self.has_fix
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn attitude(&self) -> Attitude {
        self.attitude
    }

    /// Heading in degrees `[0, 360)`
    pub fn heading(&self) -> f32 {
        self.attitude.yaw_deg()
    }

    /// Measured pitch of the mount, degrees
    pub fn pitch(&self) -> f32 {
        self.attitude.pitch_deg()
    }

    /// Tracker altitude in meters, barometric when available
    pub fn altitude(&self) -> f32 {
        match self.baro {
            Some(baro) => baro.altitude_m,
            None => self.location.alt_m(),
        }
    }

    pub fn baro(&self) -> Option<BaroReading> {
        self.baro
    }

    pub fn altitude_offset(&self) -> f32 {
        self.altitude_offset
    }

    pub fn set_altitude_offset(&mut self, offset: f32) {
        self.altitude_offset = offset;
    }

    /// Set the offset so that tracker altitude + offset equals the vehicle's
    /// last reported altitude. Returns the new offset.
    pub fn calibrate_altitude(&mut self, vehicle: &VehicleState) -> Result<f32, CalibrationError> {
        if !vehicle.location_valid {
            return Err(CalibrationError::VehicleNotValid);
        }
        self.altitude_offset = vehicle.location.alt_m() - self.altitude();
        Ok(self.altitude_offset)
    }

    /// Height of a vehicle reporting `vehicle_pressure_pa` above the tracker,
    /// from the standard atmosphere. `None` without a usable local barometer.
    pub fn baro_altitude_difference(&self, vehicle_pressure_pa: f32) -> Option<f32> {
        let baro = self.baro?;
        if baro.pressure_pa <= 0.0 || vehicle_pressure_pa <= 0.0 {
            return None;
        }
        let ratio = vehicle_pressure_pa / baro.pressure_pa;
        let temp_k = baro.temperature_c + 273.15;
        let diff = BARO_SCALE * temp_k * (1.0 - libm::expf(BARO_EXPONENT * libm::logf(ratio)));
        diff.is_finite().then_some(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::FixedPoseEstimator;

    fn site() -> Location {
        Location::from_degrees(-35.36, 149.16, 580.0)
    }

    #[test]
    fn refresh_uses_estimator_fix() {
        let est = FixedPoseEstimator::new(Some(site()), Attitude::from_euler_deg(0.0, 0.0, 90.0));
        let mut pose = TrackerPose::new();
        pose.refresh(&est, None);
        assert_eq!(pose.location(), site());
        assert!(pose.has_position_fix());
        assert!((pose.heading() - 90.0).abs() < 0.01);
        assert!((pose.altitude() - 580.0).abs() < 0.01);
    }

    #[test]
    fn refresh_without_fix_falls_back_to_home() {
        let est = FixedPoseEstimator::new(None, Attitude::default());
        let home = Location::from_degrees(1.0, 2.0, 3.0);
        let mut pose = TrackerPose::new();
        pose.refresh(&est, Some(home));
        assert_eq!(pose.location(), home);
        assert!(!pose.has_position_fix());
    }

    #[test]
    fn calibration_matches_vehicle_altitude() {
        let est = FixedPoseEstimator::new(Some(site()), Attitude::default());
        let mut pose = TrackerPose::new();
        pose.refresh(&est, None);

        let mut vehicle = VehicleState::default();
        assert_eq!(
            pose.calibrate_altitude(&vehicle),
            Err(CalibrationError::VehicleNotValid)
        );
        assert_eq!(pose.altitude_offset(), 0.0);

        vehicle.location_valid = true;
        vehicle.location = Location::from_degrees(-35.36, 149.17, 575.0);
        let offset = pose.calibrate_altitude(&vehicle).unwrap();
        assert!((offset + 5.0).abs() < 0.01);
        assert!((pose.altitude() + pose.altitude_offset() - 575.0).abs() < 0.01);
    }

    #[test]
    fn baro_difference_sign_and_magnitude() {
        let mut est = FixedPoseEstimator::new(Some(site()), Attitude::default());
        est.set_baro(Some(BaroReading {
            pressure_pa: 101_325.0,
            temperature_c: 15.0,
            altitude_m: 0.0,
        }));
        let mut pose = TrackerPose::new();
        pose.refresh(&est, None);

        assert!(pose.baro_altitude_difference(101_325.0).unwrap().abs() < 0.01);
        // roughly 12 Pa per meter near sea level
        let above = pose.baro_altitude_difference(101_325.0 - 1_200.0).unwrap();
        assert!(above > 95.0 && above < 105.0, "above {}", above);
        assert!(pose.baro_altitude_difference(0.0).is_none());
    }
}
