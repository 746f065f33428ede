//! Recording actuator output

use antenna_tracker_core::servo::{ActuatorOutput, Axis};

/// Actuator output that records every pulse written to it.
///
/// Writes while disabled are counted separately; the generator never makes
/// them, so a non-zero count points at a bypassed enable check.
#[derive(Debug, Default)]
pub struct RecordingActuators {
    enabled: bool,
    yaw: Vec<u16>,
    pitch: Vec<u16>,
    writes_while_disabled: u32,
    enable_changes: u32,
}

impl RecordingActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pulses written to `axis`, oldest first
    pub fn pulses(&self, axis: Axis) -> &[u16] {
        match axis {
            Axis::Yaw => &self.yaw,
            Axis::Pitch => &self.pitch,
        }
    }

    pub fn last_pulse(&self, axis: Axis) -> Option<u16> {
        self.pulses(axis).last().copied()
    }

    pub fn writes_while_disabled(&self) -> u32 {
        self.writes_while_disabled
    }

    /// Number of enable/disable transitions
    pub fn enable_changes(&self) -> u32 {
        self.enable_changes
    }

    pub fn clear(&mut self) {
        self.yaw.clear();
        self.pitch.clear();
    }
}

impl ActuatorOutput for RecordingActuators {
    fn write_pulse(&mut self, axis: Axis, pulse_us: u16) {
        if !self.enabled {
            self.writes_while_disabled += 1;
        }
        match axis {
            Axis::Yaw => self.yaw.push(pulse_us),
            Axis::Pitch => self.pitch.push(pulse_us),
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enable_changes += 1;
        }
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
