//! Servo command generator
//!
//! Owns both axis controllers and the travel-limit flags, and is the only
//! writer of the actuator output.

use super::axis::{Axis, AxisConfig, AxisController, LimitHit};
use crate::navigation::constrain;
use bitflags::bitflags;

bitflags! {
    /// Travel limits hit by the most recent command
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServoLimits: u8 {
        const YAW_LOWER = 0b0001;
        const YAW_UPPER = 0b0010;
        const PITCH_LOWER = 0b0100;
        const PITCH_UPPER = 0b1000;
    }
}

impl ServoLimits {
    fn lower(axis: Axis) -> Self {
        match axis {
            Axis::Yaw => ServoLimits::YAW_LOWER,
            Axis::Pitch => ServoLimits::PITCH_LOWER,
        }
    }

    fn upper(axis: Axis) -> Self {
        match axis {
            Axis::Yaw => ServoLimits::YAW_UPPER,
            Axis::Pitch => ServoLimits::PITCH_UPPER,
        }
    }
}

/// Hardware PWM output for the two mount axes
///
/// Implementations must hold outputs at neutral (or unpowered) while disabled.
pub trait ActuatorOutput {
    fn write_pulse(&mut self, axis: Axis, pulse_us: u16);

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;
}

/// Pulse widths for both axes, µs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCommand {
    pub yaw_us: u16,
    pub pitch_us: u16,
}

pub struct ServoCommandGenerator {
    yaw: AxisController,
    pitch: AxisController,
    limits: ServoLimits,
    test_pulses: [Option<u16>; 2],
    last: ServoCommand,
}

impl ServoCommandGenerator {
    /// Limit flags start set until the first command clears them
    pub fn new(yaw: AxisConfig, pitch: AxisConfig) -> Self {
        Self {
            last: ServoCommand {
                yaw_us: yaw.pwm_trim,
                pitch_us: pitch.pwm_trim,
            },
            yaw: AxisController::new(Axis::Yaw, yaw),
            pitch: AxisController::new(Axis::Pitch, pitch),
            limits: ServoLimits::all(),
            test_pulses: [None; 2],
        }
    }

    /// Swap in new calibration, keeping the setpoints inside the new travel.
    pub fn reconfigure(&mut self, yaw: AxisConfig, pitch: AxisConfig) {
        let yaw_sp = constrain(self.yaw.setpoint(), yaw.min_deg, yaw.max_deg);
        let pitch_sp = constrain(self.pitch.setpoint(), pitch.min_deg, pitch.max_deg);
        self.yaw = AxisController::new(Axis::Yaw, yaw);
        self.pitch = AxisController::new(Axis::Pitch, pitch);
        self.yaw.reset(yaw_sp);
        self.pitch.reset(pitch_sp);
    }

    pub fn limits(&self) -> ServoLimits {
        self.limits
    }

    pub fn last_command(&self) -> ServoCommand {
        self.last
    }

    pub fn setpoint(&self, axis: Axis) -> f32 {
        self.controller(axis).setpoint()
    }

    pub fn axis_config(&self, axis: Axis) -> &AxisConfig {
        self.controller(axis).config()
    }

    /// Slew, clamp and convert the desired angles for one tick of `dt` seconds.
    ///
    /// `None` keeps an axis at its current setpoint. `measured` is the
    /// current (yaw, pitch) of the mount in degrees.
    pub fn command(
        &mut self,
        yaw: Option<f32>,
        pitch: Option<f32>,
        measured: (f32, f32),
        dt: f32,
    ) -> ServoCommand {
        let yaw_out = self.yaw.update(yaw, measured.0, dt);
        let pitch_out = self.pitch.update(pitch, measured.1, dt);
        self.record_limit(Axis::Yaw, yaw_out.limit);
        self.record_limit(Axis::Pitch, pitch_out.limit);

        self.last = ServoCommand {
            yaw_us: yaw_out.pulse_us,
            pitch_us: pitch_out.pulse_us,
        };
        self.last
    }

    /// Trim pulses on both axes
    pub fn neutral(&mut self) -> ServoCommand {
        self.last = ServoCommand {
            yaw_us: self.yaw.neutral(),
            pitch_us: self.pitch.neutral(),
        };
        self.last
    }

    /// Store a raw test pulse for `axis`, clamped to its calibrated range.
    pub fn set_test_pulse(&mut self, axis: Axis, pulse_us: u16) -> u16 {
        let clamped = self.controller(axis).clamp_pulse(pulse_us);
        self.test_pulses[axis.index()] = Some(clamped);
        clamped
    }

    pub fn clear_test_pulses(&mut self) {
        self.test_pulses = [None; 2];
    }

    /// Test pulses, trim on axes without one
    pub fn test_output(&mut self) -> ServoCommand {
        self.last = ServoCommand {
            yaw_us: self.test_pulses[0].unwrap_or(self.yaw.config().pwm_trim),
            pitch_us: self.test_pulses[1].unwrap_or(self.pitch.config().pwm_trim),
        };
        self.last
    }

    /// Push a command to the hardware; disabled outputs are not written.
    pub fn write(&self, command: ServoCommand, enabled: bool, output: &mut dyn ActuatorOutput) {
        if output.is_enabled() != enabled {
            output.set_enabled(enabled);
        }
        if enabled {
            output.write_pulse(Axis::Yaw, command.yaw_us);
            output.write_pulse(Axis::Pitch, command.pitch_us);
        }
    }

    fn controller(&self, axis: Axis) -> &AxisController {
        match axis {
            Axis::Yaw => &self.yaw,
            Axis::Pitch => &self.pitch,
        }
    }

    fn record_limit(&mut self, axis: Axis, hit: LimitHit) {
        self.limits
            .set(ServoLimits::lower(axis), hit == LimitHit::Lower);
        self.limits
            .set(ServoLimits::upper(axis), hit == LimitHit::Upper);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::wrap_180;

    #[derive(Default)]
    struct Capture {
        enabled: bool,
        pulses: [Option<u16>; 2],
        writes: usize,
    }

    impl ActuatorOutput for Capture {
        fn write_pulse(&mut self, axis: Axis, pulse_us: u16) {
            self.pulses[axis.index()] = Some(pulse_us);
            self.writes += 1;
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    fn generator() -> ServoCommandGenerator {
        let pitch = AxisConfig {
            min_deg: -10.0,
            max_deg: 45.0,
            ..AxisConfig::pitch_default()
        };
        ServoCommandGenerator::new(AxisConfig::yaw_default(), pitch)
    }

    #[test]
    fn limits_start_set_and_follow_commands() {
        let mut gen = generator();
        assert_eq!(gen.limits(), ServoLimits::all());

        gen.command(Some(0.0), Some(10.0), (0.0, 0.0), 0.02);
        assert!(gen.limits().is_empty());

        for _ in 0..100 {
            gen.command(Some(0.0), Some(80.0), (0.0, 0.0), 0.02);
        }
        assert_eq!(gen.limits(), ServoLimits::PITCH_UPPER);
        assert!((gen.setpoint(Axis::Pitch) - 45.0).abs() < 1e-4);
    }

    #[test]
    fn yaw_pulse_slews_when_target_passes_due_south() {
        let mut gen =
            ServoCommandGenerator::new(AxisConfig::yaw_default(), AxisConfig::pitch_default());
        let max_step = 180.0 * 0.02;
        let mut desired = 170.0f32;
        for _ in 0..200 {
            gen.command(Some(desired), Some(0.0), (0.0, 0.0), 0.02);
        }
        let mut previous = (gen.setpoint(Axis::Yaw), gen.last_command().yaw_us);
        for _ in 0..400 {
            desired = wrap_180(desired + 0.1);
            let cmd = gen.command(Some(desired), Some(0.0), (0.0, 0.0), 0.02);
            let setpoint = gen.setpoint(Axis::Yaw);
            assert!(
                (setpoint - previous.0).abs() <= max_step + 1e-3,
                "setpoint {} -> {} at desired {}",
                previous.0,
                setpoint,
                desired
            );
            assert!((cmd.yaw_us as i32 - previous.1 as i32).abs() <= 9);
            previous = (setpoint, cmd.yaw_us);
        }
    }

    #[test]
    fn reconfigure_keeps_setpoint_within_new_travel() {
        let mut gen = generator();
        for _ in 0..100 {
            gen.command(Some(0.0), Some(40.0), (0.0, 0.0), 0.02);
        }
        let narrower = AxisConfig {
            min_deg: -10.0,
            max_deg: 30.0,
            ..AxisConfig::pitch_default()
        };
        gen.reconfigure(AxisConfig::yaw_default(), narrower);
        assert!((gen.setpoint(Axis::Pitch) - 30.0).abs() < 1e-4);
        assert!((gen.axis_config(Axis::Pitch).max_deg - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_pulses_are_clamped() {
        let mut gen = generator();
        assert_eq!(gen.set_test_pulse(Axis::Pitch, 2500), 1900);
        assert_eq!(
            gen.test_output(),
            ServoCommand {
                yaw_us: 1500,
                pitch_us: 1900
            }
        );
        gen.clear_test_pulses();
        assert_eq!(gen.test_output().pitch_us, 1500);
    }

    #[test]
    fn write_respects_enable() {
        let gen = generator();
        let mut out = Capture::default();
        let cmd = ServoCommand {
            yaw_us: 1600,
            pitch_us: 1400,
        };
        gen.write(cmd, false, &mut out);
        assert_eq!(out.writes, 0);
        assert!(!out.enabled);

        gen.write(cmd, true, &mut out);
        assert!(out.enabled);
        assert_eq!(out.pulses, [Some(1600), Some(1400)]);
    }
}
