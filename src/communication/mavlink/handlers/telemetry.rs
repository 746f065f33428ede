//! MAVLink Telemetry Streaming
//!
//! Periodic status messages to the Ground Control Station.
//!
//! # Supported Messages
//!
//! - **HEARTBEAT**: Mode, arming and system state (1Hz)
//! - **ATTITUDE**: Mount attitude (SR_EXTRA1)
//! - **NAV_CONTROLLER_OUTPUT**: Bearing, distance and pitch to the vehicle (SR_EXTRA1)
//! - **GLOBAL_POSITION_INT**: Tracker location (SR_POSITION)
//! - **SERVO_OUTPUT_RAW**: Yaw and pitch pulse widths (SR_EXTRA3)
//! - **SYS_STATUS**: Load and scheduler overruns (SR_EXTRA1, max 1Hz)

use super::super::state::{SystemStatus, TrackerSnapshot};
use heapless::Vec;
use mavlink::common::{
    MavAutopilot, MavMessage, MavModeFlag, MavState, MavType, ATTITUDE_DATA,
    GLOBAL_POSITION_INT_DATA, HEARTBEAT_DATA, NAV_CONTROLLER_OUTPUT_DATA, SERVO_OUTPUT_RAW_DATA,
    SYS_STATUS_DATA,
};

/// Most messages a single update can produce
pub const MAX_STREAM_MESSAGES: usize = 6;

/// Stream configuration for a single telemetry message type
#[derive(Debug, Clone, Copy)]
struct StreamConfig {
    /// Target rate in Hz (0 = disabled)
    rate_hz: u32,
    /// Last send timestamp in microseconds
    last_send_us: u64,
}

impl StreamConfig {
    const fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            // never sent
            last_send_us: u64::MAX,
        }
    }

    fn should_send(&self, current_time_us: u64) -> bool {
        if self.rate_hz == 0 {
            return false;
        }
        if self.last_send_us == u64::MAX {
            return true;
        }
        let interval_us = 1_000_000 / self.rate_hz as u64;
        current_time_us.saturating_sub(self.last_send_us) >= interval_us
    }

    fn mark_sent(&mut self, timestamp_us: u64) {
        self.last_send_us = timestamp_us;
    }
}

/// Stream rates in Hz, from the SR_* parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRates {
    pub position: u32,
    pub extra1: u32,
    pub extra3: u32,
}

impl Default for StreamRates {
    fn default() -> Self {
        Self {
            position: 2,
            extra1: 5,
            extra3: 2,
        }
    }
}

/// Telemetry streamer for periodic message transmission
pub struct TelemetryStreamer {
    heartbeat: StreamConfig,
    attitude: StreamConfig,
    nav: StreamConfig,
    position: StreamConfig,
    servo: StreamConfig,
    sys_status: StreamConfig,
}

impl TelemetryStreamer {
    pub fn new(rates: StreamRates) -> Self {
        let mut streamer = Self {
            heartbeat: StreamConfig::new(1),
            attitude: StreamConfig::new(0),
            nav: StreamConfig::new(0),
            position: StreamConfig::new(0),
            servo: StreamConfig::new(0),
            sys_status: StreamConfig::new(0),
        };
        streamer.update_rates(rates);
        streamer
    }

    /// Apply new SR_* rates; HEARTBEAT stays at 1Hz
    pub fn update_rates(&mut self, rates: StreamRates) {
        self.attitude.rate_hz = rates.extra1;
        self.nav.rate_hz = rates.extra1;
        self.sys_status.rate_hz = rates.extra1.min(1);
        self.position.rate_hz = rates.position;
        self.servo.rate_hz = rates.extra3;
    }

    /// Messages due at `current_time_us`, in a fixed order
    pub fn update(
        &mut self,
        state: &TrackerSnapshot,
        current_time_us: u64,
    ) -> Vec<MavMessage, MAX_STREAM_MESSAGES> {
        let mut messages = Vec::new();

        let streams: [(&mut StreamConfig, fn(&TrackerSnapshot) -> MavMessage); 6] = [
            (&mut self.heartbeat, Self::build_heartbeat),
            (&mut self.attitude, Self::build_attitude),
            (&mut self.nav, Self::build_nav_controller_output),
            (&mut self.position, Self::build_global_position),
            (&mut self.servo, Self::build_servo_output),
            (&mut self.sys_status, Self::build_sys_status),
        ];

        for (stream, build) in streams {
            if stream.should_send(current_time_us) {
                let _ = messages.push(build(state));
                stream.mark_sent(current_time_us);
            }
        }

        messages
    }

    /// Build HEARTBEAT; also sent right after mode and arming changes
    pub fn build_heartbeat(state: &TrackerSnapshot) -> MavMessage {
        let mut base_mode = MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED;
        if state.armed {
            base_mode |= MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED;
        }
        let system_status = match state.status {
            SystemStatus::Boot => MavState::MAV_STATE_BOOT,
            SystemStatus::Standby => MavState::MAV_STATE_STANDBY,
            SystemStatus::Active => MavState::MAV_STATE_ACTIVE,
        };

        MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: state.mode.custom_mode(),
            mavtype: MavType::MAV_TYPE_ANTENNA_TRACKER,
            autopilot: MavAutopilot::MAV_AUTOPILOT_GENERIC,
            base_mode,
            system_status,
            mavlink_version: 3,
        })
    }

    fn build_attitude(state: &TrackerSnapshot) -> MavMessage {
        let (roll, pitch, yaw) = state.attitude_deg;
        MavMessage::ATTITUDE(ATTITUDE_DATA {
            time_boot_ms: state.uptime_ms(),
            roll: roll.to_radians(),
            pitch: pitch.to_radians(),
            yaw: yaw.to_radians(),
            ..Default::default()
        })
    }

    fn build_nav_controller_output(state: &TrackerSnapshot) -> MavMessage {
        let bearing = libm::roundf(state.bearing) as i16;
        MavMessage::NAV_CONTROLLER_OUTPUT(NAV_CONTROLLER_OUTPUT_DATA {
            nav_pitch: state.pitch,
            nav_bearing: bearing,
            target_bearing: bearing,
            wp_dist: state.distance.clamp(0.0, u16::MAX as f32) as u16,
            alt_error: state.altitude_difference,
            ..Default::default()
        })
    }

    fn build_global_position(state: &TrackerSnapshot) -> MavMessage {
        let heading_cdeg = libm::roundf(state.attitude_deg.2 * 100.0) as u16 % 36_000;
        MavMessage::GLOBAL_POSITION_INT(GLOBAL_POSITION_INT_DATA {
            time_boot_ms: state.uptime_ms(),
            lat: state.location.lat,
            lon: state.location.lng,
            alt: state.location.alt_cm.saturating_mul(10),
            relative_alt: (state.relative_alt_m * 1000.0) as i32,
            hdg: heading_cdeg,
            ..Default::default()
        })
    }

    fn build_servo_output(state: &TrackerSnapshot) -> MavMessage {
        MavMessage::SERVO_OUTPUT_RAW(SERVO_OUTPUT_RAW_DATA {
            time_usec: (state.uptime_us % (u32::MAX as u64 + 1)) as u32,
            servo1_raw: state.servo.yaw_us,
            servo2_raw: state.servo.pitch_us,
            ..Default::default()
        })
    }

    fn build_sys_status(state: &TrackerSnapshot) -> MavMessage {
        MavMessage::SYS_STATUS(SYS_STATUS_DATA {
            // 0.1% units
            load: (state.cpu_load_percent * 10.0).clamp(0.0, 1000.0) as u16,
            voltage_battery: u16::MAX,
            current_battery: -1,
            battery_remaining: -1,
            errors_count1: state.overruns.min(u16::MAX as u32) as u16,
            errors_count2: state.deferred_messages,
            ..Default::default()
        })
    }
}
