//! Tracker Parameter Definitions
//!
//! Tracking, mode and scheduling parameters using ArduPilot AntennaTracker
//! names where one exists.
//!
//! # Parameters
//!
//! - `SYSID_TARGET` - System id of the tracked vehicle (0 = first heard)
//! - `TRK_TIMEOUT` - Staleness threshold for position reports, seconds
//! - `INITIAL_MODE` - Mode entered once home is known (custom mode number)
//! - `AUTO_FALLBACK` - AUTO behaviour without a valid vehicle (0 hold, 1 scan)
//! - `ALT_SOURCE` - Vehicle altitude source (0 GPS, 1 barometer)
//! - `AHRS_TYPE` - Attitude estimator (0 DCM, 1 EKF, 2 fixed site)
//! - `YAW_TRIM` / `PITCH_TRIM` - Trims added in AUTO, degrees
//! - `SCAN_SPEED_YAW` / `SCAN_SPEED_PIT` - Sweep rates, deg/s
//! - `SCAN_YAW_MIN` / `SCAN_YAW_MAX` / `SCAN_PIT_MIN` / `SCAN_PIT_MAX` - Sweep limits, degrees
//! - `SCHED_LOOP_HZ` - Scheduler base rate
//! - `GND_START_CNT` - Consecutive own fixes needed to set home
//! - `SR_POSITION` / `SR_EXTRA1` / `SR_EXTRA3` - Telemetry stream rates, Hz

use super::error::ParameterError;
use super::storage::{load_float, load_int, ParamFlags, ParamValue, ParameterStore};
use crate::mode::{AutoFallback, ControlMode, ScanConfig, Trims};
use crate::pose::EstimatorKind;

// --- Defaults ---

const DEFAULT_TIMEOUT_S: f32 = 5.0;
const DEFAULT_INITIAL_MODE: i32 = ControlMode::Stop as i32;
const DEFAULT_SCAN_SPEED: f32 = 2.0;
const DEFAULT_SCAN_YAW_MIN: f32 = 0.0;
const DEFAULT_SCAN_YAW_MAX: f32 = 360.0;
const DEFAULT_SCAN_PIT_MIN: f32 = -10.0;
const DEFAULT_SCAN_PIT_MAX: f32 = 45.0;
const DEFAULT_LOOP_HZ: i32 = 50;
const DEFAULT_GND_START_CNT: i32 = 5;
const DEFAULT_SR_POSITION: i32 = 2;
const DEFAULT_SR_EXTRA1: i32 = 5;
const DEFAULT_SR_EXTRA3: i32 = 2;

// --- Ranges ---

const MIN_TIMEOUT_S: f32 = 0.5;
const MAX_TIMEOUT_S: f32 = 60.0;
const MAX_TRIM: f32 = 10.0;
const MAX_SCAN_SPEED: f32 = 100.0;
const MIN_LOOP_HZ: i32 = 10;
const MAX_LOOP_HZ: i32 = 400;
const MAX_STREAM_HZ: i32 = 50;

/// Vehicle altitude source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AltSource {
    /// Altitude from the vehicle's position reports
    #[default]
    Gps,
    /// Pressure difference between vehicle and tracker barometers
    Baro,
}

/// Tracker parameters loaded from parameter store
#[derive(Debug, Clone)]
pub struct TrackerParams {
    pub sysid_target: u8,
    pub timeout_s: f32,
    pub initial_mode: ControlMode,
    pub auto_fallback: AutoFallback,
    pub alt_source: AltSource,
    pub ahrs_type: EstimatorKind,
    pub yaw_trim: f32,
    pub pitch_trim: f32,
    pub scan_speed_yaw: f32,
    pub scan_speed_pitch: f32,
    pub scan_yaw_min: f32,
    pub scan_yaw_max: f32,
    pub scan_pitch_min: f32,
    pub scan_pitch_max: f32,
    pub loop_hz: u16,
    pub ground_start_count: u8,
    pub sr_position: u8,
    pub sr_extra1: u8,
    pub sr_extra3: u8,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            sysid_target: 0,
            timeout_s: DEFAULT_TIMEOUT_S,
            initial_mode: ControlMode::Stop,
            auto_fallback: AutoFallback::Hold,
            alt_source: AltSource::Gps,
            ahrs_type: EstimatorKind::Dcm,
            yaw_trim: 0.0,
            pitch_trim: 0.0,
            scan_speed_yaw: DEFAULT_SCAN_SPEED,
            scan_speed_pitch: DEFAULT_SCAN_SPEED,
            scan_yaw_min: DEFAULT_SCAN_YAW_MIN,
            scan_yaw_max: DEFAULT_SCAN_YAW_MAX,
            scan_pitch_min: DEFAULT_SCAN_PIT_MIN,
            scan_pitch_max: DEFAULT_SCAN_PIT_MAX,
            loop_hz: DEFAULT_LOOP_HZ as u16,
            ground_start_count: DEFAULT_GND_START_CNT as u8,
            sr_position: DEFAULT_SR_POSITION as u8,
            sr_extra1: DEFAULT_SR_EXTRA1 as u8,
            sr_extra3: DEFAULT_SR_EXTRA3 as u8,
        }
    }
}

impl TrackerParams {
    /// Register tracker parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let ints: [(&str, i32); 10] = [
            ("SYSID_TARGET", 0),
            ("INITIAL_MODE", DEFAULT_INITIAL_MODE),
            ("AUTO_FALLBACK", 0),
            ("ALT_SOURCE", 0),
            ("AHRS_TYPE", EstimatorKind::Dcm as i32),
            ("SCHED_LOOP_HZ", DEFAULT_LOOP_HZ),
            ("GND_START_CNT", DEFAULT_GND_START_CNT),
            ("SR_POSITION", DEFAULT_SR_POSITION),
            ("SR_EXTRA1", DEFAULT_SR_EXTRA1),
            ("SR_EXTRA3", DEFAULT_SR_EXTRA3),
        ];
        for (name, value) in ints {
            store.register(name, ParamValue::Int(value), ParamFlags::empty())?;
        }

        let floats: [(&str, f32); 9] = [
            ("TRK_TIMEOUT", DEFAULT_TIMEOUT_S),
            ("YAW_TRIM", 0.0),
            ("PITCH_TRIM", 0.0),
            ("SCAN_SPEED_YAW", DEFAULT_SCAN_SPEED),
            ("SCAN_SPEED_PIT", DEFAULT_SCAN_SPEED),
            ("SCAN_YAW_MIN", DEFAULT_SCAN_YAW_MIN),
            ("SCAN_YAW_MAX", DEFAULT_SCAN_YAW_MAX),
            ("SCAN_PIT_MIN", DEFAULT_SCAN_PIT_MIN),
            ("SCAN_PIT_MAX", DEFAULT_SCAN_PIT_MAX),
        ];
        for (name, value) in floats {
            store.register(name, ParamValue::Float(value), ParamFlags::empty())?;
        }

        Ok(())
    }

    /// Load tracker parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        let initial = load_int(store, "INITIAL_MODE", DEFAULT_INITIAL_MODE, 0, 255);
        let ahrs = load_int(store, "AHRS_TYPE", 0, 0, 2);

        Self {
            sysid_target: load_int(store, "SYSID_TARGET", 0, 0, 255) as u8,
            timeout_s: load_float(store, "TRK_TIMEOUT", DEFAULT_TIMEOUT_S, MIN_TIMEOUT_S, MAX_TIMEOUT_S),
            initial_mode: ControlMode::from_custom_mode(initial as u32)
                .unwrap_or(ControlMode::Stop),
            auto_fallback: AutoFallback::from_param(load_int(store, "AUTO_FALLBACK", 0, 0, 1)),
            alt_source: if load_int(store, "ALT_SOURCE", 0, 0, 1) == 1 {
                AltSource::Baro
            } else {
                AltSource::Gps
            },
            ahrs_type: EstimatorKind::from_param(ahrs).unwrap_or(EstimatorKind::Dcm),
            yaw_trim: load_float(store, "YAW_TRIM", 0.0, -MAX_TRIM, MAX_TRIM),
            pitch_trim: load_float(store, "PITCH_TRIM", 0.0, -MAX_TRIM, MAX_TRIM),
            scan_speed_yaw: load_float(store, "SCAN_SPEED_YAW", DEFAULT_SCAN_SPEED, 0.0, MAX_SCAN_SPEED),
            scan_speed_pitch: load_float(store, "SCAN_SPEED_PIT", DEFAULT_SCAN_SPEED, 0.0, MAX_SCAN_SPEED),
            scan_yaw_min: load_float(store, "SCAN_YAW_MIN", DEFAULT_SCAN_YAW_MIN, -720.0, 720.0),
            scan_yaw_max: load_float(store, "SCAN_YAW_MAX", DEFAULT_SCAN_YAW_MAX, -720.0, 720.0),
            scan_pitch_min: load_float(store, "SCAN_PIT_MIN", DEFAULT_SCAN_PIT_MIN, -90.0, 90.0),
            scan_pitch_max: load_float(store, "SCAN_PIT_MAX", DEFAULT_SCAN_PIT_MAX, -90.0, 90.0),
            loop_hz: load_int(store, "SCHED_LOOP_HZ", DEFAULT_LOOP_HZ, MIN_LOOP_HZ, MAX_LOOP_HZ) as u16,
            ground_start_count: load_int(store, "GND_START_CNT", DEFAULT_GND_START_CNT, 1, 100) as u8,
            sr_position: load_int(store, "SR_POSITION", DEFAULT_SR_POSITION, 0, MAX_STREAM_HZ) as u8,
            sr_extra1: load_int(store, "SR_EXTRA1", DEFAULT_SR_EXTRA1, 0, MAX_STREAM_HZ) as u8,
            sr_extra3: load_int(store, "SR_EXTRA3", DEFAULT_SR_EXTRA3, 0, MAX_STREAM_HZ) as u8,
        }
    }

    /// Validate parameter consistency
    pub fn is_valid(&self) -> bool {
        if self.timeout_s < MIN_TIMEOUT_S || self.timeout_s > MAX_TIMEOUT_S {
            return false;
        }
        if self.scan_yaw_min >= self.scan_yaw_max || self.scan_pitch_min >= self.scan_pitch_max {
            return false;
        }
        if (self.loop_hz as i32) < MIN_LOOP_HZ || (self.loop_hz as i32) > MAX_LOOP_HZ {
            return false;
        }
        if self.initial_mode == ControlMode::Initialising {
            return false;
        }
        self.ground_start_count > 0
    }

    /// Staleness threshold in microseconds
    pub fn staleness_us(&self) -> u64 {
        (self.timeout_s * 1_000_000.0) as u64
    }

    /// Scheduler tick length in seconds
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.loop_hz.max(1) as f32
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::from_rates(
            self.scan_speed_yaw,
            self.scan_speed_pitch,
            self.loop_hz,
            (self.scan_yaw_min, self.scan_yaw_max),
            (self.scan_pitch_min, self.scan_pitch_max),
        )
    }

    pub fn trims(&self) -> Trims {
        Trims {
            yaw: self.yaw_trim,
            pitch: self.pitch_trim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_params_defaults() {
        let params = TrackerParams::default();
        assert!((params.timeout_s - 5.0).abs() < 0.001);
        assert_eq!(params.staleness_us(), 5_000_000);
        assert_eq!(params.initial_mode, ControlMode::Stop);
        assert_eq!(params.loop_hz, 50);
        assert!(params.is_valid());
    }

    #[test]
    fn test_tracker_params_store_round_trip() {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        let loaded = TrackerParams::from_store(&store);
        let defaults = TrackerParams::default();
        assert_eq!(loaded.initial_mode, defaults.initial_mode);
        assert_eq!(loaded.sr_extra1, defaults.sr_extra1);
        assert!((loaded.scan_pitch_max - defaults.scan_pitch_max).abs() < 0.001);
        assert_eq!(store.len(), 19);
    }

    #[test]
    fn test_tracker_params_from_store_clamps() {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        store.set("TRK_TIMEOUT", ParamValue::Float(1000.0)).unwrap();
        store.set("INITIAL_MODE", ParamValue::Int(10)).unwrap();
        store.set("AHRS_TYPE", ParamValue::Int(2)).unwrap();
        store.set("AUTO_FALLBACK", ParamValue::Int(1)).unwrap();
        store.set("ALT_SOURCE", ParamValue::Int(1)).unwrap();

        let params = TrackerParams::from_store(&store);
        assert!((params.timeout_s - MAX_TIMEOUT_S).abs() < 0.001);
        assert_eq!(params.initial_mode, ControlMode::Auto);
        assert_eq!(params.ahrs_type, EstimatorKind::Fixed);
        assert_eq!(params.auto_fallback, AutoFallback::Scan);
        assert_eq!(params.alt_source, AltSource::Baro);
    }

    #[test]
    fn test_unknown_initial_mode_falls_back_to_stop() {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        store.set("INITIAL_MODE", ParamValue::Int(7)).unwrap();
        assert_eq!(TrackerParams::from_store(&store).initial_mode, ControlMode::Stop);
    }

    #[test]
    fn test_tracker_params_validation() {
        let params = TrackerParams {
            scan_pitch_min: 50.0,
            ..TrackerParams::default()
        };
        assert!(!params.is_valid());

        let params = TrackerParams {
            initial_mode: ControlMode::Initialising,
            ..TrackerParams::default()
        };
        assert!(!params.is_valid());
    }

    #[test]
    fn test_scan_config_steps() {
        let params = TrackerParams {
            scan_speed_yaw: 10.0,
            ..TrackerParams::default()
        };
        let scan = params.scan_config();
        assert!((scan.yaw_step - 0.2).abs() < 1e-6);
        assert!((scan.pitch_step - 0.04).abs() < 1e-6);
    }
}
