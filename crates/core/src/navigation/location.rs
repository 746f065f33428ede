//! Fixed-point geographic locations
//!
//! Latitude and longitude are stored as degrees ×1e7 in `i32`, altitude as
//! centimeters. Arithmetic is done on differences so that `f32` never has to
//! hold an absolute ×1e7 coordinate.

/// Meters per 1e-7 degree of latitude (and of longitude at the equator).
pub const LOCATION_SCALING_FACTOR: f32 = 0.011_131_884;

/// Inverse of [`LOCATION_SCALING_FACTOR`].
pub const LOCATION_SCALING_FACTOR_INV: f32 = 89.832_05;

const LAT_LIMIT_E7: i32 = 900_000_000;
const LNG_LIMIT_E7: i32 = 1_800_000_000;
const LNG_SPAN_E7: i64 = 3_600_000_000;

/// Geographic location in fixed-point form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// Latitude, degrees ×1e7
    pub lat: i32,
    /// Longitude, degrees ×1e7
    pub lng: i32,
    /// Altitude above mean sea level, centimeters
    pub alt_cm: i32,
}

impl Location {
    /// Create a location from fixed-point components
    pub const fn new(lat: i32, lng: i32, alt_cm: i32) -> Self {
        Self { lat, lng, alt_cm }
    }

    /// Create a location from floating point degrees and meters (test and config helper)
    pub fn from_degrees(lat_deg: f64, lng_deg: f64, alt_m: f32) -> Self {
        Self {
            lat: libm::round(lat_deg * 1e7) as i32,
            lng: libm::round(lng_deg * 1e7) as i32,
            alt_cm: libm::roundf(alt_m * 100.0) as i32,
        }
    }

    /// Altitude in meters
    pub fn alt_m(&self) -> f32 {
        self.alt_cm as f32 * 0.01
    }

    /// Latitude within ±90°, longitude within ±180° and not the 0/0 point.
    ///
    /// 0/0 is what an unset GPS reports, so it is never treated as a real fix.
    pub fn is_plausible(&self) -> bool {
        if self.lat == 0 && self.lng == 0 {
            return false;
        }
        self.lat.abs() <= LAT_LIMIT_E7 && self.lng.abs() <= LNG_LIMIT_E7
    }

    /// Move the location by a flat-earth offset in meters.
    ///
    /// Longitude wraps across the antimeridian; latitude saturates at the poles.
    pub fn offset(&mut self, north_m: f32, east_m: f32) {
        let dlat = north_m * LOCATION_SCALING_FACTOR_INV;
        let dlng = east_m * LOCATION_SCALING_FACTOR_INV / longitude_scale(self.lat);

        let lat = self.lat as i64 + libm::roundf(dlat) as i64;
        self.lat = lat.clamp(-(LAT_LIMIT_E7 as i64), LAT_LIMIT_E7 as i64) as i32;
        self.lng = wrap_longitude(self.lng as i64 + libm::roundf(dlng) as i64);
    }

    /// Move the location `distance_m` meters along `bearing_deg`.
    pub fn offset_bearing(&mut self, bearing_deg: f32, distance_m: f32) {
        let rad = bearing_deg.to_radians();
        let north = libm::cosf(rad) * distance_m;
        let east = libm::sinf(rad) * distance_m;
        self.offset(north, east);
    }

    /// Initial great-circle bearing to `other`, degrees in `[0, 360)`.
    pub fn bearing_to(&self, other: &Location) -> f32 {
        let lat1 = (self.lat as f64 * 1e-7).to_radians();
        let lat2 = (other.lat as f64 * 1e-7).to_radians();
        let dlng = (longitude_delta(self.lng, other.lng) as f64 * 1e-7).to_radians();

        let y = libm::sin(dlng) * libm::cos(lat2);
        let x = libm::cos(lat1) * libm::sin(lat2)
            - libm::sin(lat1) * libm::cos(lat2) * libm::cos(dlng);
        let bearing = libm::atan2(y, x).to_degrees() as f32;
        wrap_360(bearing)
    }

    /// Horizontal distance to `other` in meters (equirectangular).
    pub fn distance_to(&self, other: &Location) -> f32 {
        let dlat = (other.lat as i64 - self.lat as i64) as f32;
        let mid_lat = ((self.lat as i64 + other.lat as i64) / 2) as i32;
        let dlng = longitude_delta(self.lng, other.lng) as f32 * longitude_scale(mid_lat);
        libm::sqrtf(dlat * dlat + dlng * dlng) * LOCATION_SCALING_FACTOR
    }
}

/// Cosine of latitude, bounded away from zero near the poles.
pub fn longitude_scale(lat_e7: i32) -> f32 {
    let scale = libm::cosf((lat_e7 as f32 * 1e-7).to_radians());
    if scale < 0.01 {
        0.01
    } else {
        scale
    }
}

/// Wrap an angle in degrees to `[0, 360)`.
pub fn wrap_360(angle: f32) -> f32 {
    let mut wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    // -1e-9 % 360 + 360 rounds to exactly 360 in f32
    if wrapped >= 360.0 {
        wrapped = 0.0;
    }
    wrapped
}

/// Wrap an angle in degrees to `(-180, 180]`.
pub fn wrap_180(angle: f32) -> f32 {
    let wrapped = wrap_360(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Shortest signed longitude difference `to - from`, degrees ×1e7.
fn longitude_delta(from: i32, to: i32) -> i64 {
    let mut delta = to as i64 - from as i64;
    if delta > LNG_LIMIT_E7 as i64 {
        delta -= LNG_SPAN_E7;
    } else if delta < -(LNG_LIMIT_E7 as i64) {
        delta += LNG_SPAN_E7;
    }
    delta
}

fn wrap_longitude(lng: i64) -> i32 {
    let mut lng = lng;
    if lng > LNG_LIMIT_E7 as i64 {
        lng -= LNG_SPAN_E7;
    } else if lng < -(LNG_LIMIT_E7 as i64) {
        lng += LNG_SPAN_E7;
    }
    lng as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Location {
        Location::from_degrees(-35.362_938, 149.165_085, 584.0)
    }

    #[test]
    fn plausibility_rejects_null_island_and_out_of_range() {
        assert!(!Location::new(0, 0, 100).is_plausible());
        assert!(!Location::new(900_000_001, 10, 0).is_plausible());
        assert!(!Location::new(10, -1_800_000_001, 0).is_plausible());
        assert!(home().is_plausible());
        assert!(Location::new(0, 1, 0).is_plausible());
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = home();
        let mut north = origin;
        north.offset(100.0, 0.0);
        let mut east = origin;
        east.offset(0.0, 100.0);
        let mut south = origin;
        south.offset(-100.0, 0.0);
        let mut west = origin;
        west.offset(0.0, -100.0);

        let b = origin.bearing_to(&north);
        assert!(b < 0.1 || b > 359.9, "north bearing {}", b);
        assert!((origin.bearing_to(&east) - 90.0).abs() < 0.1);
        assert!((origin.bearing_to(&south) - 180.0).abs() < 0.1);
        assert!((origin.bearing_to(&west) - 270.0).abs() < 0.1);
    }

    #[test]
    fn bearing_always_in_range() {
        let origin = home();
        for step in 0..72 {
            let mut target = origin;
            target.offset_bearing(step as f32 * 5.0 - 180.0, 250.0);
            let b = origin.bearing_to(&target);
            assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
        }
    }

    #[test]
    fn bearing_across_antimeridian_is_short_way() {
        let a = Location::from_degrees(0.0, 179.999, 0.0);
        let b = Location::from_degrees(0.0, -179.999, 0.0);
        assert!((a.bearing_to(&b) - 90.0).abs() < 0.1);
        assert!(a.distance_to(&b) < 300.0);
    }

    #[test]
    fn offset_and_distance_agree() {
        let origin = home();
        let mut target = origin;
        target.offset(300.0, 400.0);
        let d = origin.distance_to(&target);
        assert!((d - 500.0).abs() < 1.0, "distance {}", d);
        assert_eq!(target.alt_cm, origin.alt_cm);
    }

    #[test]
    fn distance_to_self_is_exactly_zero() {
        let origin = home();
        assert_eq!(origin.distance_to(&origin), 0.0);
    }

    #[test]
    fn wrap_helpers() {
        assert!((wrap_360(-10.0) - 350.0).abs() < 1e-4);
        assert!((wrap_360(720.0)).abs() < 1e-4);
        assert!(wrap_360(-1e-9) < 360.0);
        assert!((wrap_180(350.0) + 10.0).abs() < 1e-4);
        assert!((wrap_180(180.0) - 180.0).abs() < 1e-4);
        assert!((wrap_180(-190.0) - 170.0).abs() < 1e-4);
    }
}
