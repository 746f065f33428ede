//! Control mode identifiers and errors

/// Tracker control mode
///
/// Discriminants are the values carried in `HEARTBEAT.custom_mode` and
/// accepted by `SET_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlMode {
    Manual = 0,
    Stop = 1,
    Scan = 2,
    ServoTest = 3,
    Guided = 4,
    Auto = 10,
    Initialising = 16,
}

impl ControlMode {
    /// Every mode in dispatch-table order
    pub const ALL: [ControlMode; 7] = [
        ControlMode::Manual,
        ControlMode::Stop,
        ControlMode::Scan,
        ControlMode::ServoTest,
        ControlMode::Guided,
        ControlMode::Auto,
        ControlMode::Initialising,
    ];

    /// Decode a MAVLink custom mode number
    pub fn from_custom_mode(value: u32) -> Option<Self> {
        match value {
            0 => Some(ControlMode::Manual),
            1 => Some(ControlMode::Stop),
            2 => Some(ControlMode::Scan),
            3 => Some(ControlMode::ServoTest),
            4 => Some(ControlMode::Guided),
            10 => Some(ControlMode::Auto),
            16 => Some(ControlMode::Initialising),
            _ => None,
        }
    }

    pub fn custom_mode(&self) -> u32 {
        *self as u8 as u32
    }

    /// Position in [`ControlMode::ALL`] and the dispatch table
    pub fn index(&self) -> usize {
        match self {
            ControlMode::Manual => 0,
            ControlMode::Stop => 1,
            ControlMode::Scan => 2,
            ControlMode::ServoTest => 3,
            ControlMode::Guided => 4,
            ControlMode::Auto => 5,
            ControlMode::Initialising => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlMode::Manual => "MANUAL",
            ControlMode::Stop => "STOP",
            ControlMode::Scan => "SCAN",
            ControlMode::ServoTest => "SERVO_TEST",
            ControlMode::Guided => "GUIDED",
            ControlMode::Auto => "AUTO",
            ControlMode::Initialising => "INITIALISING",
        }
    }
}

/// Rejected mode or arming request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    /// The mode cannot be requested (INITIALISING)
    NotRequestable,
    /// The mode needs a home position
    HomeNotSet,
    /// SERVO_TEST entry needs the tracker stopped and disarmed
    NotDisarmed,
    /// Servo test values are only accepted in SERVO_TEST
    ServoTestInactive,
    /// Pointing targets are only accepted in GUIDED
    GuidedInactive,
    /// Arming is not possible in the current mode
    CannotArm,
    /// Custom mode number unknown
    UnknownMode(u32),
}

impl ModeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeError::NotRequestable => "mode cannot be requested",
            ModeError::HomeNotSet => "home not set",
            ModeError::NotDisarmed => "tracker must be stopped",
            ModeError::ServoTestInactive => "not in servo test",
            ModeError::GuidedInactive => "not in guided",
            ModeError::CannotArm => "cannot arm in this mode",
            ModeError::UnknownMode(_) => "unknown mode",
        }
    }
}

impl core::fmt::Display for ModeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ModeError::UnknownMode(value) => write!(f, "unknown mode {}", value),
            other => f.write_str(other.as_str()),
        }
    }
}
