//! Tracking input decoding
//!
//! Converts the vehicle and operator messages into core types:
//!
//! - `GLOBAL_POSITION_INT` → [`PositionReport`]
//! - `SCALED_PRESSURE` → [`PressureReport`]
//! - `MANUAL_CONTROL` → [`ManualInput`]

use antenna_tracker_core::mode::ManualInput;
use antenna_tracker_core::navigation::{wrap_360, Location};
use antenna_tracker_core::vehicle::PositionReport;
use mavlink::common::{GLOBAL_POSITION_INT_DATA, MANUAL_CONTROL_DATA, SCALED_PRESSURE_DATA};

/// `hdg` value meaning "heading unknown"
const HEADING_UNKNOWN: u16 = u16::MAX;

/// `MANUAL_CONTROL` axis value meaning "axis unused"
const AXIS_UNUSED: i16 = 0x7FFF;

/// Barometer sample reported by the vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureReport {
    /// Absolute pressure, Pa
    pub pressure_pa: f32,
    /// Temperature, °C
    pub temperature_c: f32,
}

/// Decode a vehicle position report.
///
/// Course comes from `hdg`; when the vehicle does not report one it is
/// derived from the horizontal velocity.
pub fn position_report(data: &GLOBAL_POSITION_INT_DATA) -> PositionReport {
    let vx = data.vx as f32 * 0.01;
    let vy = data.vy as f32 * 0.01;

    let heading_deg = if data.hdg == HEADING_UNKNOWN {
        wrap_360(libm::atan2f(vy, vx).to_degrees())
    } else {
        data.hdg as f32 * 0.01
    };

    PositionReport {
        location: Location::new(data.lat, data.lon, data.alt / 10),
        heading_deg,
        ground_speed: libm::sqrtf(vx * vx + vy * vy),
        timestamp_ms: data.time_boot_ms,
    }
}

/// Decode a vehicle pressure report (`press_abs` is in hPa)
pub fn pressure_report(data: &SCALED_PRESSURE_DATA) -> PressureReport {
    PressureReport {
        pressure_pa: data.press_abs * 100.0,
        temperature_c: data.temperature as f32 * 0.01,
    }
}

/// Decode operator input: `x` is yaw and `y` is pitch, both in degrees.
pub fn manual_input(data: &MANUAL_CONTROL_DATA) -> ManualInput {
    let axis = |value: i16| (value != AXIS_UNUSED).then_some(value as f32);
    ManualInput {
        yaw: axis(data.x),
        pitch: axis(data.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_report_units() {
        let data = GLOBAL_POSITION_INT_DATA {
            time_boot_ms: 1234,
            lat: -353_632_620,
            lon: 1_491_652_300,
            alt: 584_250,
            vx: 300,
            vy: 400,
            hdg: 9_000,
            ..Default::default()
        };
        let report = position_report(&data);
        assert_eq!(report.location, Location::new(-353_632_620, 1_491_652_300, 58_425));
        assert!((report.heading_deg - 90.0).abs() < 0.001);
        assert!((report.ground_speed - 5.0).abs() < 0.001);
        assert_eq!(report.timestamp_ms, 1234);
    }

    #[test]
    fn test_position_report_heading_from_velocity() {
        let data = GLOBAL_POSITION_INT_DATA {
            lat: 1,
            lon: 1,
            vx: 0,
            vy: -500,
            hdg: u16::MAX,
            ..Default::default()
        };
        let report = position_report(&data);
        assert!((report.heading_deg - 270.0).abs() < 0.01);
    }

    #[test]
    fn test_pressure_report_units() {
        let data = SCALED_PRESSURE_DATA {
            press_abs: 1013.25,
            temperature: 2150,
            ..Default::default()
        };
        let report = pressure_report(&data);
        assert!((report.pressure_pa - 101_325.0).abs() < 0.1);
        assert!((report.temperature_c - 21.5).abs() < 0.001);
    }

    #[test]
    fn test_manual_input_unused_axis() {
        let data = MANUAL_CONTROL_DATA {
            x: 45,
            y: 0x7FFF,
            ..Default::default()
        };
        let input = manual_input(&data);
        assert_eq!(input.yaw, Some(45.0));
        assert_eq!(input.pitch, None);
    }
}
