//! Command Protocol Handler
//!
//! Decodes COMMAND_LONG into tracker commands and builds the COMMAND_ACK.
//!
//! # Supported Commands
//!
//! - **MAV_CMD_DO_SET_MODE**: param2 = custom mode
//! - **MAV_CMD_DO_SET_SERVO**: param1 = servo (1 yaw, 2 pitch), param2 = PWM µs
//! - **MAV_CMD_DO_SET_HOME**: param1 = 1 uses the current location,
//!   otherwise param5/6/7 = latitude, longitude (degrees), altitude (m)
//! - **MAV_CMD_PREFLIGHT_CALIBRATION**: param3 = 1 calibrates altitude
//! - **MAV_CMD_DO_MOUNT_CONTROL**: param1 = pitch, param3 = yaw (degrees)
//! - **MAV_CMD_COMPONENT_ARM_DISARM**: param1 = 1 arm, 0 disarm
//!
//! # Command Flow
//!
//! 1. `decode()` validates the command and its parameters
//! 2. The tracker executes the command
//! 3. `result_for()` maps the outcome to a MAV_RESULT
//! 4. `ack()` builds the COMMAND_ACK sent back to the GCS

use crate::error::TrackerError;
use antenna_tracker_core::navigation::Location;
use mavlink::common::{MavCmd, MavMessage, MavResult, COMMAND_ACK_DATA, COMMAND_LONG_DATA};

/// Where a set-home command puts home
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomeRequest {
    /// The tracker's own current location
    Current,
    Location(Location),
}

/// Command decoded from COMMAND_LONG or SET_MODE
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerCommand {
    SetMode(u32),
    SetServo { servo: u8, pulse_us: u16 },
    SetHome(HomeRequest),
    CalibrateAltitude,
    MountControl { pitch: f32, yaw: f32 },
    ArmDisarm(bool),
}

/// Command handler for COMMAND_LONG messages
#[derive(Debug, Default)]
pub struct CommandHandler {
    received: u32,
    rejected: u32,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a COMMAND_LONG.
    ///
    /// Unknown commands and malformed parameters are returned as the
    /// MAV_RESULT to acknowledge with.
    pub fn decode(&mut self, cmd: &COMMAND_LONG_DATA) -> Result<TrackerCommand, MavResult> {
        crate::log_debug!("Received COMMAND_LONG: command={}", cmd.command as u32);
        self.received = self.received.wrapping_add(1);

        let decoded = match cmd.command {
            MavCmd::MAV_CMD_DO_SET_MODE => Self::decode_set_mode(cmd),
            MavCmd::MAV_CMD_DO_SET_SERVO => Self::decode_set_servo(cmd),
            MavCmd::MAV_CMD_DO_SET_HOME => Self::decode_set_home(cmd),
            MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION => {
                if cmd.param3 == 1.0 {
                    Ok(TrackerCommand::CalibrateAltitude)
                } else {
                    Err(MavResult::MAV_RESULT_UNSUPPORTED)
                }
            }
            MavCmd::MAV_CMD_DO_MOUNT_CONTROL => {
                if cmd.param1.is_finite() && cmd.param3.is_finite() {
                    Ok(TrackerCommand::MountControl {
                        pitch: cmd.param1,
                        yaw: cmd.param3,
                    })
                } else {
                    Err(MavResult::MAV_RESULT_DENIED)
                }
            }
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM => {
                if cmd.param1 == 1.0 {
                    Ok(TrackerCommand::ArmDisarm(true))
                } else if cmd.param1 == 0.0 {
                    Ok(TrackerCommand::ArmDisarm(false))
                } else {
                    Err(MavResult::MAV_RESULT_DENIED)
                }
            }
            _ => {
                crate::log_debug!("Unsupported command: {}", cmd.command as u32);
                Err(MavResult::MAV_RESULT_UNSUPPORTED)
            }
        };

        if decoded.is_err() {
            self.rejected = self.rejected.wrapping_add(1);
        }
        decoded
    }

    fn decode_set_mode(cmd: &COMMAND_LONG_DATA) -> Result<TrackerCommand, MavResult> {
        if !cmd.param2.is_finite() || cmd.param2 < 0.0 {
            return Err(MavResult::MAV_RESULT_DENIED);
        }
        Ok(TrackerCommand::SetMode(cmd.param2 as u32))
    }

    fn decode_set_servo(cmd: &COMMAND_LONG_DATA) -> Result<TrackerCommand, MavResult> {
        let valid_servo = cmd.param1 == 1.0 || cmd.param1 == 2.0;
        let valid_pwm = cmd.param2.is_finite() && cmd.param2 >= 0.0 && cmd.param2 <= u16::MAX as f32;
        if !valid_servo || !valid_pwm {
            crate::log_warn!("DO_SET_SERVO rejected: servo {} pwm {}", cmd.param1, cmd.param2);
            return Err(MavResult::MAV_RESULT_DENIED);
        }
        Ok(TrackerCommand::SetServo {
            servo: cmd.param1 as u8,
            pulse_us: cmd.param2 as u16,
        })
    }

    fn decode_set_home(cmd: &COMMAND_LONG_DATA) -> Result<TrackerCommand, MavResult> {
        if cmd.param1 == 1.0 {
            return Ok(TrackerCommand::SetHome(HomeRequest::Current));
        }
        if !(cmd.param5.is_finite() && cmd.param6.is_finite() && cmd.param7.is_finite()) {
            return Err(MavResult::MAV_RESULT_DENIED);
        }
        let home = Location::from_degrees(cmd.param5 as f64, cmd.param6 as f64, cmd.param7);
        if !home.is_plausible() {
            return Err(MavResult::MAV_RESULT_DENIED);
        }
        Ok(TrackerCommand::SetHome(HomeRequest::Location(home)))
    }

    /// MAV_RESULT for the outcome of an executed command
    pub fn result_for(outcome: &Result<(), TrackerError>) -> MavResult {
        match outcome {
            Ok(()) => MavResult::MAV_RESULT_ACCEPTED,
            Err(TrackerError::HomeStorage(_)) | Err(TrackerError::Link(_)) => {
                MavResult::MAV_RESULT_FAILED
            }
            Err(TrackerError::Calibration(_)) => MavResult::MAV_RESULT_TEMPORARILY_REJECTED,
            Err(_) => MavResult::MAV_RESULT_DENIED,
        }
    }

    /// Build a COMMAND_ACK
    pub fn ack(command: MavCmd, result: MavResult) -> MavMessage {
        MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
            command,
            result,
            ..Default::default()
        })
    }

    /// Commands received so far
    pub fn received(&self) -> u32 {
        self.received
    }

    /// Commands rejected while decoding
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::home::StorageError;
    use antenna_tracker_core::mode::ModeError;
    use antenna_tracker_core::pose::CalibrationError;

    fn command_long(command: MavCmd, params: [f32; 7]) -> COMMAND_LONG_DATA {
        COMMAND_LONG_DATA {
            target_system: 1,
            target_component: 1,
            command,
            confirmation: 0,
            param1: params[0],
            param2: params[1],
            param3: params[2],
            param4: params[3],
            param5: params[4],
            param6: params[5],
            param7: params[6],
        }
    }

    #[test]
    fn test_decode_set_mode() {
        let mut handler = CommandHandler::new();
        let cmd = command_long(MavCmd::MAV_CMD_DO_SET_MODE, [1.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(handler.decode(&cmd), Ok(TrackerCommand::SetMode(10)));
        assert_eq!(handler.received(), 1);
    }

    #[test]
    fn test_decode_set_servo_validates_servo_number() {
        let mut handler = CommandHandler::new();
        let ok = command_long(MavCmd::MAV_CMD_DO_SET_SERVO, [2.0, 1700.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            handler.decode(&ok),
            Ok(TrackerCommand::SetServo {
                servo: 2,
                pulse_us: 1700
            })
        );

        let bad = command_long(MavCmd::MAV_CMD_DO_SET_SERVO, [5.0, 1700.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(handler.decode(&bad), Err(MavResult::MAV_RESULT_DENIED));
        assert_eq!(handler.rejected(), 1);
    }

    #[test]
    fn test_decode_set_home() {
        let mut handler = CommandHandler::new();
        let current = command_long(MavCmd::MAV_CMD_DO_SET_HOME, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            handler.decode(&current),
            Ok(TrackerCommand::SetHome(HomeRequest::Current))
        );

        let explicit = command_long(
            MavCmd::MAV_CMD_DO_SET_HOME,
            [0.0, 0.0, 0.0, 0.0, 47.5, 8.5, 400.0],
        );
        match handler.decode(&explicit) {
            Ok(TrackerCommand::SetHome(HomeRequest::Location(home))) => {
                assert!((home.lat - 475_000_000).abs() < 10);
                assert_eq!(home.alt_cm, 40_000);
            }
            other => panic!("unexpected {:?}", other),
        }

        let null_island = command_long(MavCmd::MAV_CMD_DO_SET_HOME, [0.0; 7]);
        assert_eq!(handler.decode(&null_island), Err(MavResult::MAV_RESULT_DENIED));
    }

    #[test]
    fn test_decode_calibration_and_mount() {
        let mut handler = CommandHandler::new();
        let baro = command_long(
            MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION,
            [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        );
        assert_eq!(handler.decode(&baro), Ok(TrackerCommand::CalibrateAltitude));

        let gyro = command_long(
            MavCmd::MAV_CMD_PREFLIGHT_CALIBRATION,
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        assert_eq!(handler.decode(&gyro), Err(MavResult::MAV_RESULT_UNSUPPORTED));

        let mount = command_long(
            MavCmd::MAV_CMD_DO_MOUNT_CONTROL,
            [20.0, 0.0, 135.0, 0.0, 0.0, 0.0, 0.0],
        );
        assert_eq!(
            handler.decode(&mount),
            Ok(TrackerCommand::MountControl {
                pitch: 20.0,
                yaw: 135.0
            })
        );
    }

    #[test]
    fn test_decode_arm_disarm() {
        let mut handler = CommandHandler::new();
        let arm = command_long(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let disarm = command_long(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM, [0.0; 7]);
        assert_eq!(handler.decode(&arm), Ok(TrackerCommand::ArmDisarm(true)));
        assert_eq!(handler.decode(&disarm), Ok(TrackerCommand::ArmDisarm(false)));
    }

    #[test]
    fn test_decode_unsupported() {
        let mut handler = CommandHandler::new();
        let cmd = command_long(MavCmd::MAV_CMD_NAV_TAKEOFF, [0.0; 7]);
        assert_eq!(handler.decode(&cmd), Err(MavResult::MAV_RESULT_UNSUPPORTED));
    }

    #[test]
    fn test_result_mapping() {
        assert_eq!(CommandHandler::result_for(&Ok(())), MavResult::MAV_RESULT_ACCEPTED);
        assert_eq!(
            CommandHandler::result_for(&Err(ModeError::HomeNotSet.into())),
            MavResult::MAV_RESULT_DENIED
        );
        assert_eq!(
            CommandHandler::result_for(&Err(StorageError::WriteFailed.into())),
            MavResult::MAV_RESULT_FAILED
        );
        assert_eq!(
            CommandHandler::result_for(&Err(CalibrationError::VehicleNotValid.into())),
            MavResult::MAV_RESULT_TEMPORARILY_REJECTED
        );
    }

    #[test]
    fn test_ack_message() {
        match CommandHandler::ack(MavCmd::MAV_CMD_DO_SET_HOME, MavResult::MAV_RESULT_FAILED) {
            MavMessage::COMMAND_ACK(ack) => {
                assert_eq!(ack.command, MavCmd::MAV_CMD_DO_SET_HOME);
                assert_eq!(ack.result, MavResult::MAV_RESULT_FAILED);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
