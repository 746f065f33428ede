//! MAVLink Message Router
//!
//! Turns inbound messages into [`Inbound`] events for the tracker.
//!
//! # Responsibilities
//!
//! - Filter vehicle reports to the tracked system (`SYSID_TARGET`, 0 adopts
//!   the first system that reports a position)
//! - Drop commands addressed to other systems
//! - Decode commands through the [`CommandHandler`]
//! - Track the GCS connection from its heartbeats

use super::handlers::command::{CommandHandler, TrackerCommand};
use super::handlers::tracking::{self, PressureReport};
use super::TRACKER_SYSTEM_ID;
use antenna_tracker_core::mode::ManualInput;
use antenna_tracker_core::vehicle::PositionReport;
use mavlink::common::{MavCmd, MavMessage, MavResult, MavType, PARAM_REQUEST_READ_DATA, PARAM_SET_DATA};
use mavlink::MavHeader;

/// GCS link considered lost after this long without a heartbeat
pub const GCS_TIMEOUT_US: u64 = 5_000_000;

/// Connection state with Ground Control Station
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionState {
    /// A GCS heartbeat has been received
    pub connected: bool,
    /// Last heartbeat timestamp (microseconds since boot)
    pub last_heartbeat_us: u64,
    /// Number of heartbeats received
    pub heartbeat_count: u32,
}

impl ConnectionState {
    /// True if a heartbeat arrived within `timeout_us`
    pub fn is_active(&self, current_time_us: u64, timeout_us: u64) -> bool {
        self.connected && current_time_us.saturating_sub(self.last_heartbeat_us) < timeout_us
    }

    pub fn update_heartbeat(&mut self, timestamp_us: u64) {
        self.connected = true;
        self.last_heartbeat_us = timestamp_us;
        self.heartbeat_count = self.heartbeat_count.wrapping_add(1);
    }
}

/// Router statistics for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Total messages processed
    pub messages_processed: u32,
    /// Messages with no handler
    pub unhandled_messages: u32,
    /// Vehicle reports from systems other than the tracked one
    pub filtered_reports: u32,
    /// Commands addressed to another system
    pub foreign_commands: u32,
}

/// Inbound event for the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Position(PositionReport),
    Pressure(PressureReport),
    ManualControl(ManualInput),
    SetMode(u32),
    /// Decoded COMMAND_LONG; `Err` carries the MAV_RESULT to reject with
    Command {
        command: MavCmd,
        decoded: Result<TrackerCommand, MavResult>,
    },
    ParamRequestList,
    ParamRequestRead(PARAM_REQUEST_READ_DATA),
    ParamSet(PARAM_SET_DATA),
}

/// MAVLink message router
#[derive(Debug, Default)]
pub struct MessageRouter {
    /// Tracked vehicle system id, 0 until one is adopted
    target_sysid: u8,
    /// True when `target_sysid` was configured rather than adopted
    target_fixed: bool,
    connection: ConnectionState,
    stats: RouterStats,
    command_handler: CommandHandler,
}

impl MessageRouter {
    /// Router tracking `sysid_target` (0 = adopt the first vehicle heard)
    pub fn new(sysid_target: u8) -> Self {
        let mut router = Self::default();
        router.set_target(sysid_target);
        router
    }

    /// Change the tracked system; 0 re-enables adoption
    pub fn set_target(&mut self, sysid_target: u8) {
        if sysid_target == 0 && self.target_fixed {
            self.target_sysid = 0;
        } else if sysid_target != 0 {
            self.target_sysid = sysid_target;
        }
        self.target_fixed = sysid_target != 0;
    }

    /// Tracked system id, `None` until one is known
    pub fn target(&self) -> Option<u8> {
        (self.target_sysid != 0).then_some(self.target_sysid)
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn command_handler(&self) -> &CommandHandler {
        &self.command_handler
    }

    /// Route one message received at `timestamp_us`
    pub fn route(
        &mut self,
        header: &MavHeader,
        message: &MavMessage,
        timestamp_us: u64,
    ) -> Option<Inbound> {
        self.stats.messages_processed = self.stats.messages_processed.wrapping_add(1);

        match message {
            MavMessage::HEARTBEAT(data) => {
                if data.mavtype == MavType::MAV_TYPE_GCS {
                    self.connection.update_heartbeat(timestamp_us);
                }
                None
            }

            // Vehicle reports
            MavMessage::GLOBAL_POSITION_INT(data) => {
                if !self.accept_vehicle(header.system_id) {
                    return None;
                }
                Some(Inbound::Position(tracking::position_report(data)))
            }
            MavMessage::SCALED_PRESSURE(data) => {
                if !self.is_target(header.system_id) {
                    self.stats.filtered_reports = self.stats.filtered_reports.wrapping_add(1);
                    return None;
                }
                Some(Inbound::Pressure(tracking::pressure_report(data)))
            }

            // Operator
            MavMessage::MANUAL_CONTROL(data) => {
                if !self.addressed_to_us(data.target) {
                    return None;
                }
                Some(Inbound::ManualControl(tracking::manual_input(data)))
            }
            MavMessage::SET_MODE(data) => {
                if !self.addressed_to_us(data.target_system) {
                    return None;
                }
                Some(Inbound::SetMode(data.custom_mode))
            }
            MavMessage::COMMAND_LONG(data) => {
                if !self.addressed_to_us(data.target_system) {
                    return None;
                }
                Some(Inbound::Command {
                    command: data.command,
                    decoded: self.command_handler.decode(data),
                })
            }

            // Parameter protocol
            MavMessage::PARAM_REQUEST_LIST(data) => {
                if !self.addressed_to_us(data.target_system) {
                    return None;
                }
                Some(Inbound::ParamRequestList)
            }
            MavMessage::PARAM_REQUEST_READ(data) => {
                if !self.addressed_to_us(data.target_system) {
                    return None;
                }
                Some(Inbound::ParamRequestRead(data.clone()))
            }
            MavMessage::PARAM_SET(data) => {
                if !self.addressed_to_us(data.target_system) {
                    return None;
                }
                Some(Inbound::ParamSet(data.clone()))
            }

            _ => {
                self.stats.unhandled_messages = self.stats.unhandled_messages.wrapping_add(1);
                None
            }
        }
    }

    fn is_target(&self, system_id: u8) -> bool {
        self.target_sysid != 0 && system_id == self.target_sysid
    }

    /// Position reports from the tracked system, adopting one if needed
    fn accept_vehicle(&mut self, system_id: u8) -> bool {
        if self.target_sysid == 0 && system_id != TRACKER_SYSTEM_ID {
            self.target_sysid = system_id;
            crate::log_info!("Tracking system {}", system_id);
        }
        if self.is_target(system_id) {
            true
        } else {
            self.stats.filtered_reports = self.stats.filtered_reports.wrapping_add(1);
            false
        }
    }

    /// Broadcast (0) or our own system id
    fn addressed_to_us(&mut self, target_system: u8) -> bool {
        if target_system == 0 || target_system == TRACKER_SYSTEM_ID {
            true
        } else {
            self.stats.foreign_commands = self.stats.foreign_commands.wrapping_add(1);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlink::common::{
        COMMAND_LONG_DATA, GLOBAL_POSITION_INT_DATA, HEARTBEAT_DATA, SCALED_PRESSURE_DATA,
        SET_MODE_DATA,
    };

    fn header(system_id: u8) -> MavHeader {
        MavHeader {
            system_id,
            component_id: 1,
            sequence: 0,
        }
    }

    fn position() -> MavMessage {
        MavMessage::GLOBAL_POSITION_INT(GLOBAL_POSITION_INT_DATA {
            lat: 473_977_418,
            lon: 85_455_939,
            alt: 500_000,
            ..Default::default()
        })
    }

    #[test]
    fn test_adopts_first_vehicle() {
        let mut router = MessageRouter::new(0);
        assert_eq!(router.target(), None);

        assert!(matches!(
            router.route(&header(42), &position(), 0),
            Some(Inbound::Position(_))
        ));
        assert_eq!(router.target(), Some(42));

        assert_eq!(router.route(&header(43), &position(), 0), None);
        assert_eq!(router.stats().filtered_reports, 1);
    }

    #[test]
    fn test_configured_target_filters() {
        let mut router = MessageRouter::new(7);
        assert_eq!(router.route(&header(42), &position(), 0), None);
        assert!(router.route(&header(7), &position(), 0).is_some());

        let pressure = MavMessage::SCALED_PRESSURE(SCALED_PRESSURE_DATA {
            press_abs: 950.0,
            ..Default::default()
        });
        assert!(router.route(&header(42), &pressure, 0).is_none());
        assert!(matches!(
            router.route(&header(7), &pressure, 0),
            Some(Inbound::Pressure(_))
        ));
    }

    #[test]
    fn test_pressure_before_target_is_dropped() {
        let mut router = MessageRouter::new(0);
        let pressure = MavMessage::SCALED_PRESSURE(SCALED_PRESSURE_DATA::default());
        assert!(router.route(&header(42), &pressure, 0).is_none());
    }

    #[test]
    fn test_set_target_back_to_adoption() {
        let mut router = MessageRouter::new(7);
        router.set_target(0);
        assert_eq!(router.target(), None);
        router.route(&header(9), &position(), 0);
        assert_eq!(router.target(), Some(9));
        // re-applying 0 keeps the adopted system
        router.set_target(0);
        assert_eq!(router.target(), Some(9));
    }

    #[test]
    fn test_gcs_heartbeat_tracks_connection() {
        let mut router = MessageRouter::new(0);
        let gcs = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            mavtype: MavType::MAV_TYPE_GCS,
            ..Default::default()
        });
        router.route(&header(255), &gcs, 1_000_000);
        assert!(router.connection().is_active(2_000_000, GCS_TIMEOUT_US));
        assert!(!router.connection().is_active(7_000_000, GCS_TIMEOUT_US));
        assert_eq!(router.target(), None);
    }

    #[test]
    fn test_commands_for_other_systems_are_dropped() {
        let mut router = MessageRouter::new(0);
        let set_mode = MavMessage::SET_MODE(SET_MODE_DATA {
            target_system: 5,
            custom_mode: 10,
            ..Default::default()
        });
        assert!(router.route(&header(255), &set_mode, 0).is_none());
        assert_eq!(router.stats().foreign_commands, 1);

        let cmd = MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
            target_system: TRACKER_SYSTEM_ID,
            command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            param1: 1.0,
            ..Default::default()
        });
        assert_eq!(
            router.route(&header(255), &cmd, 0),
            Some(Inbound::Command {
                command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
                decoded: Ok(TrackerCommand::ArmDisarm(true)),
            })
        );
        assert_eq!(router.command_handler().received(), 1);
    }
}
