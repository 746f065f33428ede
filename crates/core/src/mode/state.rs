//! Mode state types
//!
//! Inputs and per-mode state that persist across update cycles.

use crate::navigation::{constrain, NavStatus};

/// Latest operator input per axis, degrees. `None` when the axis is unused.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualInput {
    pub yaw: Option<f32>,
    pub pitch: Option<f32>,
}

/// Trims added to the geometry solution in AUTO, degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trims {
    pub yaw: f32,
    pub pitch: f32,
}

/// Externally supplied absolute pointing target for GUIDED
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidedTarget {
    pub yaw: f32,
    pub pitch: f32,
}

/// What AUTO does when the vehicle location is not valid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoFallback {
    /// Keep the last setpoint
    #[default]
    Hold,
    /// Sweep until tracking resumes
    Scan,
}

impl AutoFallback {
    pub fn from_param(value: i32) -> Self {
        if value == 1 {
            AutoFallback::Scan
        } else {
            AutoFallback::Hold
        }
    }
}

/// Scan sweep limits and per-tick steps, degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    pub yaw_min: f32,
    pub yaw_max: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub yaw_step: f32,
    pub pitch_step: f32,
}

impl ScanConfig {
    /// Steps from sweep rates in deg/s at the scheduler rate
    pub fn from_rates(
        yaw_speed: f32,
        pitch_speed: f32,
        loop_hz: u16,
        yaw_range: (f32, f32),
        pitch_range: (f32, f32),
    ) -> Self {
        let hz = if loop_hz == 0 { 1.0 } else { loop_hz as f32 };
        Self {
            yaw_min: yaw_range.0,
            yaw_max: yaw_range.1,
            pitch_min: pitch_range.0,
            pitch_max: pitch_range.1,
            yaw_step: yaw_speed / hz,
            pitch_step: pitch_speed / hz,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_rates(2.0, 2.0, 50, (0.0, 360.0), (-10.0, 45.0))
    }
}

/// Current sweep position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanState {
    pub yaw: f32,
    pub pitch: f32,
}

impl ScanState {
    /// Start sweeping from the current pointing solution
    pub fn seed(nav: &NavStatus) -> Self {
        Self {
            yaw: nav.bearing,
            pitch: nav.pitch,
        }
    }

    /// Advance one tick; axes under manual control are left alone.
    pub fn step(&mut self, config: &ScanConfig, nav: &mut NavStatus) {
        if !nav.manual_control_yaw {
            self.yaw = sweep(
                self.yaw,
                config.yaw_step,
                config.yaw_min,
                config.yaw_max,
                &mut nav.scan_reverse_yaw,
            );
        }
        if !nav.manual_control_pitch {
            self.pitch = sweep(
                self.pitch,
                config.pitch_step,
                config.pitch_min,
                config.pitch_max,
                &mut nav.scan_reverse_pitch,
            );
        }
    }
}

/// One bounce-sweep step; the direction flips on the tick a limit is reached.
fn sweep(value: f32, step: f32, min: f32, max: f32, reverse: &mut bool) -> f32 {
    let next = if *reverse { value - step } else { value + step };
    if !*reverse && next >= max {
        *reverse = true;
    } else if *reverse && next <= min {
        *reverse = false;
    }
    constrain(next, min, max)
}

/// Mode-owned state kept by the state machine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeData {
    pub scan: ScanState,
    pub guided: Option<GuidedTarget>,
}
