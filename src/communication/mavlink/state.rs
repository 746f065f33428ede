//! Tracker state snapshot for telemetry
//!
//! The tracker fills one [`TrackerSnapshot`] per telemetry pass; message
//! builders only ever read from it.

use antenna_tracker_core::mode::ControlMode;
use antenna_tracker_core::navigation::Location;
use antenna_tracker_core::servo::ServoCommand;

/// Overall tracker status as reported in HEARTBEAT
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemStatus {
    /// Waiting for a home position
    #[default]
    Boot,
    /// Initialised, outputs disarmed
    Standby,
    /// Driving the mount
    Active,
}

/// Everything the telemetry streamer reports
#[derive(Debug, Clone, Copy)]
pub struct TrackerSnapshot {
    pub uptime_us: u64,
    pub mode: ControlMode,
    pub armed: bool,
    pub status: SystemStatus,
    /// Roll, pitch, yaw of the mount, degrees
    pub attitude_deg: (f32, f32, f32),
    pub location: Location,
    /// Tracker altitude above home, meters
    pub relative_alt_m: f32,
    pub has_position_fix: bool,
    pub bearing: f32,
    pub distance: f32,
    pub pitch: f32,
    pub altitude_difference: f32,
    pub vehicle_valid: bool,
    pub servo: ServoCommand,
    /// CPU load in percent
    pub cpu_load_percent: f32,
    pub overruns: u32,
    pub deferred_messages: u16,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            uptime_us: 0,
            mode: ControlMode::Initialising,
            armed: false,
            status: SystemStatus::Boot,
            attitude_deg: (0.0, 0.0, 0.0),
            location: Location::default(),
            relative_alt_m: 0.0,
            has_position_fix: false,
            bearing: 0.0,
            distance: 0.0,
            pitch: 0.0,
            altitude_difference: 0.0,
            vehicle_valid: false,
            servo: ServoCommand {
                yaw_us: 0,
                pitch_us: 0,
            },
            cpu_load_percent: 0.0,
            overruns: 0,
            deferred_messages: 0,
        }
    }
}

impl TrackerSnapshot {
    pub fn uptime_ms(&self) -> u32 {
        (self.uptime_us / 1000).min(u32::MAX as u64) as u32
    }

    /// Status derived from mode and arming
    pub fn status_for(mode: ControlMode, armed: bool) -> SystemStatus {
        match (mode, armed) {
            (ControlMode::Initialising, _) => SystemStatus::Boot,
            (ControlMode::ServoTest, _) | (_, true) => SystemStatus::Active,
            _ => SystemStatus::Standby,
        }
    }
}
