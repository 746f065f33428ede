//! Geometry calculator
//!
//! Pure combination of the tracker's pose and the vehicle estimate into the
//! pointing solution, plus the `NavStatus` record that carries it between
//! ticks.

use super::location::Location;

/// Pointing solution for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Bearing from tracker to vehicle, degrees in `[0, 360)`
    pub bearing: f32,
    /// Horizontal distance, meters
    pub distance: f32,
    /// Elevation angle, degrees, within the pitch travel range
    pub pitch: f32,
    /// Vehicle altitude above the tracker after calibration, meters
    pub altitude_difference: f32,
}

/// Navigation status shared by the mode handlers and telemetry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavStatus {
    pub bearing: f32,
    pub distance: f32,
    pub pitch: f32,
    pub altitude_difference: f32,
    /// Copy of the pose source offset used for the last solution, meters
    pub altitude_offset: f32,
    /// Operator override active on yaw
    pub manual_control_yaw: bool,
    /// Operator override active on pitch
    pub manual_control_pitch: bool,
    /// Cleared by the first successful altitude calibration
    pub need_altitude_calibration: bool,
    pub scan_reverse_pitch: bool,
    pub scan_reverse_yaw: bool,
}

impl Default for NavStatus {
    fn default() -> Self {
        Self {
            bearing: 0.0,
            distance: 0.0,
            pitch: 0.0,
            altitude_difference: 0.0,
            altitude_offset: 0.0,
            manual_control_yaw: false,
            manual_control_pitch: false,
            need_altitude_calibration: true,
            scan_reverse_pitch: false,
            scan_reverse_yaw: false,
        }
    }
}

impl NavStatus {
    /// Store a freshly computed solution
    pub fn apply(&mut self, geometry: &Geometry, altitude_offset: f32) {
        self.bearing = geometry.bearing;
        self.distance = geometry.distance;
        self.pitch = geometry.pitch;
        self.altitude_difference = geometry.altitude_difference;
        self.altitude_offset = altitude_offset;
    }
}

/// Compute bearing, distance, pitch and altitude difference.
///
/// `tracker_alt` is the tracker altitude in meters from the pose source,
/// `pitch_range` the `(min, max)` pitch travel in degrees. When the vehicle
/// sits exactly on the tracker the pitch is undefined and `previous_pitch`
/// is kept.
pub fn compute_geometry(
    tracker: &Location,
    tracker_alt: f32,
    vehicle: &Location,
    altitude_offset: f32,
    previous_pitch: f32,
    pitch_range: (f32, f32),
) -> Geometry {
    let bearing = tracker.bearing_to(vehicle);
    let distance = tracker.distance_to(vehicle);
    let altitude_difference = vehicle.alt_m() - tracker_alt - altitude_offset;
    let pitch = pitch_from(altitude_difference, distance, previous_pitch, pitch_range);

    Geometry {
        bearing,
        distance,
        pitch,
        altitude_difference,
    }
}

/// Elevation angle for a height difference over a horizontal distance.
pub fn pitch_from(
    altitude_difference: f32,
    distance: f32,
    previous_pitch: f32,
    pitch_range: (f32, f32),
) -> f32 {
    if distance == 0.0 {
        return previous_pitch;
    }
    let pitch = libm::atan2f(altitude_difference, distance).to_degrees();
    if !pitch.is_finite() {
        return previous_pitch;
    }
    constrain(pitch, pitch_range.0, pitch_range.1)
}

/// Clamp that tolerates swapped bounds.
pub fn constrain(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: (f32, f32) = (-10.0, 45.0);

    fn tracker() -> Location {
        Location::from_degrees(-35.362_938, 149.165_085, 584.0)
    }

    #[test]
    fn vehicle_above_and_north() {
        let t = tracker();
        let mut v = t;
        v.offset(100.0, 0.0);
        v.alt_cm += 10_000;

        let g = compute_geometry(&t, t.alt_m(), &v, 0.0, 0.0, (-90.0, 90.0));
        assert!(g.bearing < 0.1 || g.bearing > 359.9);
        assert!((g.distance - 100.0).abs() < 0.5);
        assert!((g.altitude_difference - 100.0).abs() < 0.01);
        assert!((g.pitch - 45.0).abs() < 0.5);
    }

    #[test]
    fn altitude_offset_is_subtracted() {
        let t = tracker();
        let mut v = t;
        v.offset(0.0, 50.0);
        v.alt_cm += 2_000;

        let g = compute_geometry(&t, t.alt_m(), &v, 20.0, 3.0, RANGE);
        assert!(g.altitude_difference.abs() < 0.01);
        assert!(g.pitch.abs() < 0.01);
    }

    #[test]
    fn zero_distance_keeps_previous_pitch() {
        let t = tracker();
        let mut v = t;
        v.alt_cm += 5_000;
        let g = compute_geometry(&t, t.alt_m(), &v, 0.0, 12.5, RANGE);
        assert_eq!(g.distance, 0.0);
        assert_eq!(g.pitch, 12.5);
        assert!((g.altitude_difference - 50.0).abs() < 0.01);
    }

    #[test]
    fn pitch_clamped_to_travel_range() {
        let t = tracker();
        let mut below = t;
        below.offset(10.0, 0.0);
        below.alt_cm -= 100_000;
        let g = compute_geometry(&t, t.alt_m(), &below, 0.0, 0.0, RANGE);
        assert_eq!(g.pitch, -10.0);

        let mut above = t;
        above.offset(10.0, 0.0);
        above.alt_cm += 100_000;
        let g = compute_geometry(&t, t.alt_m(), &above, 0.0, 0.0, RANGE);
        assert_eq!(g.pitch, 45.0);
    }

    #[test]
    fn bearing_and_pitch_ranges_hold_for_many_pairs() {
        let t = tracker();
        for i in 0..36 {
            let mut v = t;
            v.offset_bearing(i as f32 * 10.0, 20.0 + i as f32 * 150.0);
            v.alt_cm += (i - 18) * 3_000;
            let g = compute_geometry(&t, t.alt_m(), &v, 0.0, 0.0, RANGE);
            assert!((0.0..360.0).contains(&g.bearing));
            assert!(g.pitch >= RANGE.0 && g.pitch <= RANGE.1);
        }
    }

    #[test]
    fn constrain_accepts_swapped_bounds() {
        assert_eq!(constrain(5.0, 10.0, -10.0), 5.0);
        assert_eq!(constrain(50.0, 10.0, -10.0), 10.0);
    }

    #[test]
    fn nav_status_starts_needing_calibration() {
        let mut nav = NavStatus::default();
        assert!(nav.need_altitude_calibration);
        let g = Geometry {
            bearing: 10.0,
            distance: 20.0,
            pitch: 5.0,
            altitude_difference: 2.0,
        };
        nav.apply(&g, 1.5);
        assert_eq!(nav.bearing, 10.0);
        assert_eq!(nav.altitude_offset, 1.5);
    }
}
