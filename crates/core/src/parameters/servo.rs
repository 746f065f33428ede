//! Servo Parameter Definitions
//!
//! One block per mount axis, prefixed `YAW_` or `PIT_`:
//!
//! - `TYPE` - 0 position, 1 on/off, 2 continuous rotation
//! - `MIN` / `MAX` - Travel limits, degrees
//! - `PWM_MIN` / `PWM_TRIM` / `PWM_MAX` - Pulse widths, µs
//! - `REV` - Reverse output
//! - `SLEW` - Setpoint slew limit, deg/s (0 = unlimited)
//! - `DEADBAND` - On/off stop band, degrees
//! - `P` / `I` / `IMAX` - Continuous rotation gains
//! - `MULTI` - Multi-turn yaw (unwrapped setpoint)

use super::error::ParameterError;
use super::storage::{load_bool, load_float, load_int, ParamFlags, ParamValue, ParameterStore};
use crate::servo::{AxisConfig, ServoKind};
use heapless::String;

const MIN_PWM: i32 = 500;
const MAX_PWM: i32 = 2500;

/// Servo parameters for both axes
#[derive(Debug, Clone, PartialEq)]
pub struct ServoParams {
    pub yaw: AxisConfig,
    pub pitch: AxisConfig,
}

impl Default for ServoParams {
    fn default() -> Self {
        Self {
            yaw: AxisConfig::yaw_default(),
            pitch: AxisConfig::pitch_default(),
        }
    }
}

fn param_name(prefix: &str, suffix: &str) -> Result<String<16>, ParameterError> {
    let mut name = String::new();
    name.push_str(prefix)
        .map_err(|_| ParameterError::NameTooLong)?;
    name.push_str(suffix)
        .map_err(|_| ParameterError::NameTooLong)?;
    Ok(name)
}

fn register_axis(
    store: &mut ParameterStore,
    prefix: &str,
    defaults: &AxisConfig,
) -> Result<(), ParameterError> {
    let entries: [(&str, ParamValue); 13] = [
        ("TYPE", ParamValue::Int(defaults.kind as i32)),
        ("MIN", ParamValue::Float(defaults.min_deg)),
        ("MAX", ParamValue::Float(defaults.max_deg)),
        ("PWM_MIN", ParamValue::Int(defaults.pwm_min as i32)),
        ("PWM_TRIM", ParamValue::Int(defaults.pwm_trim as i32)),
        ("PWM_MAX", ParamValue::Int(defaults.pwm_max as i32)),
        ("REV", ParamValue::Bool(defaults.reversed)),
        ("SLEW", ParamValue::Float(defaults.slew_deg_per_sec)),
        ("DEADBAND", ParamValue::Float(defaults.deadband_deg)),
        ("P", ParamValue::Float(defaults.kp)),
        ("I", ParamValue::Float(defaults.ki)),
        ("IMAX", ParamValue::Float(defaults.imax)),
        ("MULTI", ParamValue::Bool(defaults.multi_turn)),
    ];
    for (suffix, value) in entries {
        let name = param_name(prefix, suffix)?;
        store.register(&name, value, ParamFlags::empty())?;
    }
    Ok(())
}

fn load_axis(store: &ParameterStore, prefix: &str, d: &AxisConfig) -> AxisConfig {
    let get_f = |suffix: &str, default: f32, min: f32, max: f32| match param_name(prefix, suffix) {
        Ok(name) => load_float(store, &name, default, min, max),
        Err(_) => default,
    };
    let get_i = |suffix: &str, default: i32, min: i32, max: i32| match param_name(prefix, suffix) {
        Ok(name) => load_int(store, &name, default, min, max),
        Err(_) => default,
    };
    let get_b = |suffix: &str, default: bool| match param_name(prefix, suffix) {
        Ok(name) => load_bool(store, &name, default),
        Err(_) => default,
    };

    AxisConfig {
        kind: ServoKind::from_param(get_i("TYPE", d.kind as i32, 0, 2)),
        min_deg: get_f("MIN", d.min_deg, -720.0, 720.0),
        max_deg: get_f("MAX", d.max_deg, -720.0, 720.0),
        pwm_min: get_i("PWM_MIN", d.pwm_min as i32, MIN_PWM, MAX_PWM) as u16,
        pwm_trim: get_i("PWM_TRIM", d.pwm_trim as i32, MIN_PWM, MAX_PWM) as u16,
        pwm_max: get_i("PWM_MAX", d.pwm_max as i32, MIN_PWM, MAX_PWM) as u16,
        reversed: get_b("REV", d.reversed),
        slew_deg_per_sec: get_f("SLEW", d.slew_deg_per_sec, 0.0, 1000.0),
        deadband_deg: get_f("DEADBAND", d.deadband_deg, 0.0, 45.0),
        kp: get_f("P", d.kp, 0.0, 10.0),
        ki: get_f("I", d.ki, 0.0, 10.0),
        imax: get_f("IMAX", d.imax, 0.0, 1.0),
        multi_turn: get_b("MULTI", d.multi_turn),
    }
}

fn axis_valid(axis: &AxisConfig) -> bool {
    axis.min_deg < axis.max_deg
        && axis.pwm_min <= axis.pwm_trim
        && axis.pwm_trim <= axis.pwm_max
        && axis.pwm_min < axis.pwm_max
}

impl ServoParams {
    /// Register servo parameters for both axes with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let defaults = Self::default();
        register_axis(store, "YAW_", &defaults.yaw)?;
        register_axis(store, "PIT_", &defaults.pitch)?;
        Ok(())
    }

    /// Load servo parameters from parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        let mut pitch = load_axis(store, "PIT_", &defaults.pitch);
        // multi-turn only makes sense on yaw
        pitch.multi_turn = false;
        Self {
            yaw: load_axis(store, "YAW_", &defaults.yaw),
            pitch,
        }
    }

    /// Validate travel and pulse ranges on both axes
    pub fn is_valid(&self) -> bool {
        axis_valid(&self.yaw) && axis_valid(&self.pitch)
    }
}
