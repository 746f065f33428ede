//! Per-mode handlers and the dispatch table
//!
//! Handlers are stateless; the state they act on is owned by the state
//! machine ([`ModeData`]) and passed in on every call.
//!
//! # Lifecycle
//!
//! 1. `check_entry()` - preconditions, nothing is mutated on failure
//! 2. `enter()` - called once when the mode becomes active
//! 3. `update()` - called every tick while active

use super::state::{AutoFallback, ManualInput, ModeData, ScanConfig, ScanState, Trims};
use super::types::{ControlMode, ModeError};
use crate::navigation::NavStatus;

/// What the state machine knows when a mode is requested
#[derive(Debug, Clone, Copy)]
pub struct EntryContext {
    pub home_set: bool,
    pub current: ControlMode,
    pub armed: bool,
}

/// Per-tick inputs for the active handler
#[derive(Debug)]
pub struct ModeInputs<'a> {
    pub nav: &'a mut NavStatus,
    pub vehicle_valid: bool,
    pub manual: ManualInput,
    pub trims: Trims,
    pub scan_config: ScanConfig,
    pub fallback: AutoFallback,
}

/// Desired output selected by a handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeOutput {
    /// Point at these angles; `None` keeps the axis at its last setpoint
    Track { yaw: Option<f32>, pitch: Option<f32> },
    /// Neutral pulses on both axes
    Neutral,
    /// Raw test pulses injected by servo test commands
    Passthrough,
    /// Hand over to another mode this tick
    Fallback(ControlMode),
}

/// Behaviour of one control mode
pub trait ModeHandler: Sync {
    fn mode(&self) -> ControlMode;

    fn name(&self) -> &'static str {
        self.mode().name()
    }

    /// Whether entering this mode arms the tracking output
    fn arms_output(&self) -> bool;

    fn check_entry(&self, ctx: &EntryContext) -> Result<(), ModeError>;

    fn enter(&self, _data: &mut ModeData, _nav: &NavStatus) {}

    fn update(&self, inputs: &mut ModeInputs<'_>, data: &mut ModeData) -> ModeOutput;
}

fn require_home(ctx: &EntryContext) -> Result<(), ModeError> {
    if ctx.home_set {
        Ok(())
    } else {
        Err(ModeError::HomeNotSet)
    }
}

struct ManualHandler;

impl ModeHandler for ManualHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Manual
    }

    fn arms_output(&self) -> bool {
        true
    }

    fn check_entry(&self, _ctx: &EntryContext) -> Result<(), ModeError> {
        Ok(())
    }

    fn update(&self, inputs: &mut ModeInputs<'_>, _data: &mut ModeData) -> ModeOutput {
        ModeOutput::Track {
            yaw: inputs.manual.yaw,
            pitch: inputs.manual.pitch,
        }
    }
}

struct StopHandler;

impl ModeHandler for StopHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Stop
    }

    fn arms_output(&self) -> bool {
        false
    }

    fn check_entry(&self, _ctx: &EntryContext) -> Result<(), ModeError> {
        Ok(())
    }

    fn update(&self, _inputs: &mut ModeInputs<'_>, _data: &mut ModeData) -> ModeOutput {
        ModeOutput::Neutral
    }
}

struct ScanHandler;

impl ModeHandler for ScanHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Scan
    }

    fn arms_output(&self) -> bool {
        true
    }

    fn check_entry(&self, ctx: &EntryContext) -> Result<(), ModeError> {
        require_home(ctx)
    }

    fn enter(&self, data: &mut ModeData, nav: &NavStatus) {
        data.scan = ScanState::seed(nav);
    }

    fn update(&self, inputs: &mut ModeInputs<'_>, data: &mut ModeData) -> ModeOutput {
        data.scan.step(&inputs.scan_config, inputs.nav);
        let yaw = if inputs.nav.manual_control_yaw {
            inputs.manual.yaw
        } else {
            Some(data.scan.yaw)
        };
        let pitch = if inputs.nav.manual_control_pitch {
            inputs.manual.pitch
        } else {
            Some(data.scan.pitch)
        };
        ModeOutput::Track { yaw, pitch }
    }
}

struct ServoTestHandler;

impl ModeHandler for ServoTestHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::ServoTest
    }

    fn arms_output(&self) -> bool {
        false
    }

    fn check_entry(&self, ctx: &EntryContext) -> Result<(), ModeError> {
        let stopped = matches!(ctx.current, ControlMode::Stop | ControlMode::ServoTest);
        if stopped && !ctx.armed {
            Ok(())
        } else {
            Err(ModeError::NotDisarmed)
        }
    }

    fn update(&self, _inputs: &mut ModeInputs<'_>, _data: &mut ModeData) -> ModeOutput {
        ModeOutput::Passthrough
    }
}

struct GuidedHandler;

impl ModeHandler for GuidedHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Guided
    }

    fn arms_output(&self) -> bool {
        true
    }

    fn check_entry(&self, ctx: &EntryContext) -> Result<(), ModeError> {
        require_home(ctx)
    }

    /// Hold position until a target arrives for this session
    fn enter(&self, data: &mut ModeData, _nav: &NavStatus) {
        data.guided = None;
    }

    fn update(&self, _inputs: &mut ModeInputs<'_>, data: &mut ModeData) -> ModeOutput {
        match data.guided {
            Some(target) => ModeOutput::Track {
                yaw: Some(target.yaw),
                pitch: Some(target.pitch),
            },
            None => ModeOutput::Track {
                yaw: None,
                pitch: None,
            },
        }
    }
}

struct AutoHandler;

impl ModeHandler for AutoHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Auto
    }

    fn arms_output(&self) -> bool {
        true
    }

    fn check_entry(&self, ctx: &EntryContext) -> Result<(), ModeError> {
        require_home(ctx)
    }

    fn update(&self, inputs: &mut ModeInputs<'_>, _data: &mut ModeData) -> ModeOutput {
        if !inputs.vehicle_valid {
            return match inputs.fallback {
                AutoFallback::Hold => ModeOutput::Track {
                    yaw: None,
                    pitch: None,
                },
                AutoFallback::Scan => ModeOutput::Fallback(ControlMode::Scan),
            };
        }
        let nav = &*inputs.nav;
        let yaw = if nav.manual_control_yaw {
            inputs.manual.yaw
        } else {
            Some(nav.bearing + inputs.trims.yaw)
        };
        let pitch = if nav.manual_control_pitch {
            inputs.manual.pitch
        } else {
            Some(nav.pitch + inputs.trims.pitch)
        };
        ModeOutput::Track { yaw, pitch }
    }
}

struct InitialisingHandler;

impl ModeHandler for InitialisingHandler {
    fn mode(&self) -> ControlMode {
        ControlMode::Initialising
    }

    fn arms_output(&self) -> bool {
        false
    }

    fn check_entry(&self, _ctx: &EntryContext) -> Result<(), ModeError> {
        Err(ModeError::NotRequestable)
    }

    fn update(&self, _inputs: &mut ModeInputs<'_>, _data: &mut ModeData) -> ModeOutput {
        ModeOutput::Neutral
    }
}

/// Dispatch table indexed by [`ControlMode::index`]
static DISPATCH: [&dyn ModeHandler; 7] = [
    &ManualHandler,
    &StopHandler,
    &ScanHandler,
    &ServoTestHandler,
    &GuidedHandler,
    &AutoHandler,
    &InitialisingHandler,
];

/// Handler for `mode`
pub fn handler_for(mode: ControlMode) -> &'static dyn ModeHandler {
    DISPATCH[mode.index()]
}
