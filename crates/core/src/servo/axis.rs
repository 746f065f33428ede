//! Single-axis servo control
//!
//! Per tick: shortest-path error (yaw), slew limit, travel clamp, then the
//! actuator-kind specific conversion to a pulse width.

use super::normalized_to_pulse;
use crate::navigation::{constrain, wrap_180};

/// Mount axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Yaw,
    Pitch,
}

impl Axis {
    /// Output channel number used by servo test commands (1-based)
    pub fn from_servo_number(servo: u8) -> Option<Self> {
        match servo {
            1 => Some(Axis::Yaw),
            2 => Some(Axis::Pitch),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Axis::Yaw => 0,
            Axis::Pitch => 1,
        }
    }
}

/// Actuator kind (value of `YAW_TYPE` / `PIT_TYPE`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ServoKind {
    /// Pulse width sets the angle
    #[default]
    Position = 0,
    /// Full speed one way or the other, stop inside the deadband
    OnOff = 1,
    /// Pulse width sets the rotation rate
    ContinuousRotation = 2,
}

impl ServoKind {
    pub fn from_param(value: i32) -> Self {
        match value {
            1 => ServoKind::OnOff,
            2 => ServoKind::ContinuousRotation,
            _ => ServoKind::Position,
        }
    }
}

/// Calibration and limits of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    pub kind: ServoKind,
    /// Travel limits, degrees
    pub min_deg: f32,
    pub max_deg: f32,
    /// Pulse widths, µs
    pub pwm_min: u16,
    pub pwm_trim: u16,
    pub pwm_max: u16,
    pub reversed: bool,
    /// Maximum setpoint rate, deg/s (0 disables slew limiting)
    pub slew_deg_per_sec: f32,
    /// On/off stop band, degrees
    pub deadband_deg: f32,
    /// PI gains for continuous rotation (output is normalized -1..1)
    pub kp: f32,
    pub ki: f32,
    pub imax: f32,
    /// Accumulate the yaw setpoint without wrapping
    pub multi_turn: bool,
}

impl AxisConfig {
    pub fn yaw_default() -> Self {
        Self {
            kind: ServoKind::Position,
            min_deg: -180.0,
            max_deg: 180.0,
            pwm_min: 1100,
            pwm_trim: 1500,
            pwm_max: 1900,
            reversed: false,
            slew_deg_per_sec: 180.0,
            deadband_deg: 2.0,
            kp: 0.02,
            ki: 0.0,
            imax: 0.3,
            multi_turn: false,
        }
    }

    pub fn pitch_default() -> Self {
        Self {
            min_deg: -90.0,
            max_deg: 90.0,
            slew_deg_per_sec: 90.0,
            ..Self::yaw_default()
        }
    }

    /// Slew allowance for one tick of `dt` seconds
    pub fn max_slew_per_tick(&self, dt: f32) -> Option<f32> {
        if self.slew_deg_per_sec > 0.0 {
            Some(self.slew_deg_per_sec * dt)
        } else {
            None
        }
    }
}

/// Which travel limit the last command hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitHit {
    None,
    Lower,
    Upper,
}

/// Proportional-integral controller with a clamped integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct PiController {
    pub kp: f32,
    pub ki: f32,
    pub imax: f32,
    integrator: f32,
}

impl PiController {
    pub fn new(kp: f32, ki: f32, imax: f32) -> Self {
        Self {
            kp,
            ki,
            imax,
            integrator: 0.0,
        }
    }

    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        if self.ki > 0.0 && dt > 0.0 {
            self.integrator = constrain(self.integrator + self.ki * error * dt, -self.imax, self.imax);
        }
        self.kp * error + self.integrator
    }

    pub fn integrator(&self) -> f32 {
        self.integrator
    }

    pub fn reset(&mut self) {
        self.integrator = 0.0;
    }
}

/// Controller state for one axis
#[derive(Debug, Clone)]
pub struct AxisController {
    axis: Axis,
    config: AxisConfig,
    setpoint: f32,
    pi: PiController,
}

/// Result of one axis update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisOutput {
    pub setpoint: f32,
    pub pulse_us: u16,
    pub limit: LimitHit,
}

impl AxisController {
    /// Setpoint starts at the middle of the travel range
    pub fn new(axis: Axis, config: AxisConfig) -> Self {
        Self {
            axis,
            config,
            setpoint: (config.min_deg + config.max_deg) * 0.5,
            pi: PiController::new(config.kp, config.ki, config.imax),
        }
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn reset(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
        self.pi.reset();
    }

    fn wraps(&self) -> bool {
        self.axis == Axis::Yaw
    }

    /// The copy of `desired + k * 360` inside the travel range that is
    /// closest to the setpoint. A single-turn axis cannot pass through the
    /// end of its travel, so a heading across that point is reached the long
    /// way round. Falls back to the closest copy overall when the heading
    /// lies in a travel gap; the clamp then flags the limit.
    fn reachable_heading(&self, desired: f32) -> f32 {
        let lo = self.config.min_deg.min(self.config.max_deg);
        let hi = self.config.max_deg.max(self.config.min_deg);
        let closest = self.setpoint + wrap_180(desired - self.setpoint);
        [closest, closest - 360.0, closest + 360.0]
            .into_iter()
            .filter(|heading| (lo..=hi).contains(heading))
            .min_by(|a, b| {
                libm::fabsf(a - self.setpoint).total_cmp(&libm::fabsf(b - self.setpoint))
            })
            .unwrap_or(closest)
    }

    /// Advance one tick towards `desired` (`None` holds the setpoint).
    ///
    /// `measured` is the current axis angle from the pose source, used by the
    /// closed-loop actuator kinds.
    pub fn update(&mut self, desired: Option<f32>, measured: f32, dt: f32) -> AxisOutput {
        if let Some(desired) = desired.filter(|d| d.is_finite()) {
            let mut delta = if !self.wraps() {
                desired - self.setpoint
            } else if self.config.multi_turn {
                wrap_180(desired - self.setpoint)
            } else {
                self.reachable_heading(desired) - self.setpoint
            };
            if let Some(max_step) = self.config.max_slew_per_tick(dt) {
                delta = constrain(delta, -max_step, max_step);
            }
            self.setpoint += delta;
        }

        let limit = if self.setpoint < self.config.min_deg.min(self.config.max_deg) {
            LimitHit::Lower
        } else if self.setpoint > self.config.max_deg.max(self.config.min_deg) {
            LimitHit::Upper
        } else {
            LimitHit::None
        };
        self.setpoint = constrain(self.setpoint, self.config.min_deg, self.config.max_deg);

        let pulse_us = match self.config.kind {
            ServoKind::Position => self.position_pulse(),
            ServoKind::ContinuousRotation => {
                let error = self.error_to(measured);
                let rate = constrain(self.pi.update(error, dt), -1.0, 1.0);
                self.normalized_pulse(rate)
            }
            ServoKind::OnOff => {
                let error = self.error_to(measured);
                if libm::fabsf(error) <= self.config.deadband_deg {
                    self.config.pwm_trim
                } else if error > 0.0 {
                    self.normalized_pulse(1.0)
                } else {
                    self.normalized_pulse(-1.0)
                }
            }
        };

        AxisOutput {
            setpoint: self.setpoint,
            pulse_us,
            limit,
        }
    }

    /// Neutral pulse; clears the integrator
    pub fn neutral(&mut self) -> u16 {
        self.pi.reset();
        self.config.pwm_trim
    }

    /// Clamp a raw pulse to the calibrated range
    pub fn clamp_pulse(&self, pulse_us: u16) -> u16 {
        let lo = self.config.pwm_min.min(self.config.pwm_max);
        let hi = self.config.pwm_max.max(self.config.pwm_min);
        pulse_us.clamp(lo, hi)
    }

    fn error_to(&self, measured: f32) -> f32 {
        if self.wraps() {
            wrap_180(self.setpoint - measured)
        } else {
            self.setpoint - measured
        }
    }

    fn position_pulse(&self) -> u16 {
        let span = self.config.max_deg - self.config.min_deg;
        let mut fraction = if span > 0.0 {
            (self.setpoint - self.config.min_deg) / span
        } else {
            0.5
        };
        if self.config.reversed {
            fraction = 1.0 - fraction;
        }
        let pwm_span = self.config.pwm_max as f32 - self.config.pwm_min as f32;
        let pulse = self.config.pwm_min as f32 + fraction * pwm_span;
        self.clamp_pulse(libm::roundf(pulse) as u16)
    }

    fn normalized_pulse(&self, normalized: f32) -> u16 {
        let normalized = if self.config.reversed {
            -normalized
        } else {
            normalized
        };
        normalized_to_pulse(
            normalized,
            self.config.pwm_min,
            self.config.pwm_trim,
            self.config.pwm_max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn yaw_with_slew(deg_per_tick: f32) -> AxisController {
        let config = AxisConfig {
            slew_deg_per_sec: deg_per_tick / DT,
            ..AxisConfig::yaw_default()
        };
        AxisController::new(Axis::Yaw, config)
    }

    #[test]
    fn yaw_takes_short_path_through_north() {
        let mut yaw = yaw_with_slew(5.0);
        yaw.reset(wrap_180(350.0));

        let expected = [-5.0, 0.0, 5.0, 10.0, 10.0];
        for want in expected {
            let out = yaw.update(Some(10.0), 0.0, DT);
            assert!((out.setpoint - want).abs() < 1e-3, "{} != {}", out.setpoint, want);
        }
    }

    #[test]
    fn slew_bounded_for_full_range_steps() {
        let mut pitch = AxisController::new(
            Axis::Pitch,
            AxisConfig {
                slew_deg_per_sec: 90.0,
                ..AxisConfig::pitch_default()
            },
        );
        let max_step = 90.0 * DT;
        let mut previous = pitch.setpoint();
        for target in [90.0, -90.0, 90.0, 0.0] {
            for _ in 0..150 {
                let out = pitch.update(Some(target), 0.0, DT);
                assert!((out.setpoint - previous).abs() <= max_step + 1e-4);
                previous = out.setpoint;
            }
        }
    }

    #[test]
    fn yaw_sweep_through_south_stays_within_slew() {
        let mut yaw = AxisController::new(Axis::Yaw, AxisConfig::yaw_default());
        yaw.reset(170.0);
        let max_step = 180.0 * DT;
        let mut previous = yaw.update(Some(170.0), 0.0, DT);
        let mut desired = 170.0;
        for _ in 0..2_000 {
            desired += 0.1;
            let out = yaw.update(Some(wrap_180(desired)), 0.0, DT);
            assert!(
                (out.setpoint - previous.setpoint).abs() <= max_step + 1e-3,
                "setpoint {} -> {} at desired {}",
                previous.setpoint,
                out.setpoint,
                desired
            );
            let pulse_step = (out.pulse_us as i32 - previous.pulse_us as i32).abs();
            assert!(pulse_step <= 9, "pulse {} -> {}", previous.pulse_us, out.pulse_us);
            previous = out;
        }
        // went the long way round and caught up on the far side
        assert!((previous.setpoint - wrap_180(desired)).abs() < 0.5);
    }

    #[test]
    fn yaw_crossing_travel_end_goes_the_long_way() {
        let mut yaw = yaw_with_slew(5.0);
        yaw.reset(175.0);
        let out = yaw.update(Some(-175.0), 0.0, DT);
        assert!((out.setpoint - 170.0).abs() < 1e-3, "setpoint {}", out.setpoint);
    }

    #[test]
    fn travel_limit_reported_and_clamped() {
        let config = AxisConfig {
            min_deg: -10.0,
            max_deg: 45.0,
            slew_deg_per_sec: 0.0,
            ..AxisConfig::pitch_default()
        };
        let mut pitch = AxisController::new(Axis::Pitch, config);
        let out = pitch.update(Some(80.0), 0.0, DT);
        assert_eq!(out.limit, LimitHit::Upper);
        assert_eq!(out.setpoint, 45.0);
        assert_eq!(out.pulse_us, 1900);

        let out = pitch.update(Some(-30.0), 0.0, DT);
        assert_eq!(out.limit, LimitHit::Lower);
        assert_eq!(out.pulse_us, 1100);

        let out = pitch.update(Some(0.0), 0.0, DT);
        assert_eq!(out.limit, LimitHit::None);
    }

    #[test]
    fn position_maps_linearly_and_reverses() {
        let config = AxisConfig {
            slew_deg_per_sec: 0.0,
            ..AxisConfig::yaw_default()
        };
        let mut yaw = AxisController::new(Axis::Yaw, config);
        assert_eq!(yaw.update(Some(0.0), 0.0, DT).pulse_us, 1500);
        assert_eq!(yaw.update(Some(90.0), 0.0, DT).pulse_us, 1700);

        let mut reversed = AxisController::new(
            Axis::Yaw,
            AxisConfig {
                reversed: true,
                ..config
            },
        );
        assert_eq!(reversed.update(Some(90.0), 0.0, DT).pulse_us, 1300);
    }

    #[test]
    fn hold_keeps_setpoint() {
        let mut yaw = yaw_with_slew(5.0);
        yaw.update(Some(3.0), 0.0, DT);
        let out = yaw.update(None, 0.0, DT);
        assert!((out.setpoint - 3.0).abs() < 1e-4);
    }

    #[test]
    fn onoff_is_bang_bang_with_deadband() {
        let config = AxisConfig {
            kind: ServoKind::OnOff,
            slew_deg_per_sec: 0.0,
            deadband_deg: 2.0,
            ..AxisConfig::yaw_default()
        };
        let mut yaw = AxisController::new(Axis::Yaw, config);
        assert_eq!(yaw.update(Some(30.0), 0.0, DT).pulse_us, 1900);
        assert_eq!(yaw.update(Some(30.0), 60.0, DT).pulse_us, 1100);
        assert_eq!(yaw.update(Some(30.0), 29.0, DT).pulse_us, 1500);
        // error across north still picks the short way
        assert_eq!(yaw.update(Some(-170.0), 170.0, DT).pulse_us, 1900);
    }

    #[test]
    fn continuous_rotation_runs_pi_on_error() {
        let config = AxisConfig {
            kind: ServoKind::ContinuousRotation,
            slew_deg_per_sec: 0.0,
            kp: 0.01,
            ki: 0.5,
            imax: 0.2,
            ..AxisConfig::yaw_default()
        };
        let mut yaw = AxisController::new(Axis::Yaw, config);
        let first = yaw.update(Some(20.0), 0.0, DT).pulse_us;
        assert!(first > 1500);
        for _ in 0..200 {
            yaw.update(Some(20.0), 0.0, DT);
        }
        // integrator saturates at imax: 0.01 * 20 + 0.2 = 0.4 of full range
        let steady = yaw.update(Some(20.0), 0.0, DT).pulse_us;
        assert!((steady as i32 - 1660).abs() <= 1, "steady {}", steady);
        assert_eq!(yaw.neutral(), 1500);
    }

    #[test]
    fn multi_turn_setpoint_accumulates() {
        let config = AxisConfig {
            kind: ServoKind::ContinuousRotation,
            min_deg: -720.0,
            max_deg: 720.0,
            multi_turn: true,
            slew_deg_per_sec: 0.0,
            ..AxisConfig::yaw_default()
        };
        let mut yaw = AxisController::new(Axis::Yaw, config);
        for target in [90.0, 180.0, 270.0, 0.0] {
            yaw.update(Some(target), 0.0, DT);
        }
        assert!((yaw.setpoint() - 360.0).abs() < 1e-3);
    }
}
