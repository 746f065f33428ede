//! Servo command generation for the two-axis antenna mount
//!
//! This module turns desired yaw/pitch angles into PWM pulse widths:
//! - Shortest-path yaw handling across 0/360
//! - Slew limiting and travel clamping with limit flags
//! - Position, on/off and continuous-rotation actuator kinds
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. The hardware PWM
//! driver sits behind [`ActuatorOutput`] and is provided by the platform.
//!
//! ## Safety
//!
//! **CRITICAL**: Only [`ServoCommandGenerator::write`] touches the actuator
//! output, and it never writes pulses while the output is disabled.

mod axis;
mod generator;

pub use axis::{
    Axis, AxisConfig, AxisController, AxisOutput, LimitHit, PiController, ServoKind,
};
pub use generator::{ActuatorOutput, ServoCommand, ServoCommandGenerator, ServoLimits};

/// Convert normalized value to PWM pulse width (microseconds)
///
/// # Arguments
///
/// * `normalized` - Normalized value (-1.0 to +1.0)
/// * `min` - Minimum pulse width (μs)
/// * `neutral` - Neutral pulse width (μs)
/// * `max` - Maximum pulse width (μs)
pub fn normalized_to_pulse(normalized: f32, min: u16, neutral: u16, max: u16) -> u16 {
    if !normalized.is_finite() {
        return neutral;
    }
    let clamped = normalized.clamp(-1.0, 1.0);

    if clamped < 0.0 {
        let range = neutral.saturating_sub(min) as f32;
        neutral.saturating_sub((range * -clamped) as u16)
    } else {
        let range = max.saturating_sub(neutral) as f32;
        neutral.saturating_add((range * clamped) as u16)
    }
}
