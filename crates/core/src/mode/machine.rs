//! Control mode state machine
//!
//! Owns the active mode, the arming state of the tracking output and the
//! mode-specific state. All transitions go through [`ModeStateMachine::request`]
//! except the INITIALISING auto-advance and the AUTO/SCAN fallback.

use super::handlers::{handler_for, EntryContext, ModeInputs, ModeOutput};
use super::state::{GuidedTarget, ModeData};
use super::types::{ControlMode, ModeError};
use crate::navigation::NavStatus;

/// A completed mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: ControlMode,
    pub to: ControlMode,
    /// Tracking output armed after the change
    pub armed: bool,
}

/// Result of one state machine tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeStep {
    pub output: ModeOutput,
    /// Set when the tick changed mode on its own (fallback or return to AUTO)
    pub change: Option<ModeChange>,
}

#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    mode: ControlMode,
    armed: bool,
    data: ModeData,
    /// SCAN was entered as AUTO's fallback and returns to AUTO on its own
    scan_is_fallback: bool,
}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeStateMachine {
    /// Starts in INITIALISING, disarmed
    pub fn new() -> Self {
        Self {
            mode: ControlMode::Initialising,
            armed: false,
            data: ModeData::default(),
            scan_is_fallback: false,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Whether pulses should reach the actuators at all
    pub fn outputs_enabled(&self) -> bool {
        self.armed || self.mode == ControlMode::ServoTest
    }

    pub fn data(&self) -> &ModeData {
        &self.data
    }

    /// Validate and perform an explicit mode request.
    ///
    /// On error nothing changes.
    pub fn request(
        &mut self,
        mode: ControlMode,
        home_set: bool,
        nav: &NavStatus,
    ) -> Result<ModeChange, ModeError> {
        let ctx = EntryContext {
            home_set,
            current: self.mode,
            armed: self.armed,
        };
        handler_for(mode).check_entry(&ctx)?;
        self.scan_is_fallback = false;
        Ok(self.transition(mode, nav))
    }

    /// Leave INITIALISING once home is known.
    ///
    /// Advances to `initial` when its preconditions hold, otherwise to STOP.
    /// Returns `None` while still waiting or when already initialised.
    pub fn complete_initialisation(
        &mut self,
        initial: ControlMode,
        home_set: bool,
        nav: &NavStatus,
    ) -> Option<ModeChange> {
        if self.mode != ControlMode::Initialising || !home_set {
            return None;
        }
        match self.request(initial, home_set, nav) {
            Ok(change) => Some(change),
            Err(_) => Some(self.transition(ControlMode::Stop, nav)),
        }
    }

    /// Arm or disarm the tracking output without changing mode.
    pub fn set_armed(&mut self, armed: bool) -> Result<(), ModeError> {
        if armed && !handler_for(self.mode).arms_output() {
            return Err(ModeError::CannotArm);
        }
        self.armed = armed;
        Ok(())
    }

    /// Point at `target` while in GUIDED. The target is dropped on leaving.
    pub fn set_guided_target(&mut self, target: GuidedTarget) -> Result<(), ModeError> {
        if self.mode != ControlMode::Guided {
            return Err(ModeError::GuidedInactive);
        }
        self.data.guided = Some(target);
        Ok(())
    }

    /// Run the active handler for one tick.
    pub fn update(&mut self, inputs: &mut ModeInputs<'_>) -> ModeStep {
        let mut change = None;

        if self.mode == ControlMode::Scan && self.scan_is_fallback && inputs.vehicle_valid {
            self.scan_is_fallback = false;
            change = Some(self.switch_keeping_arm(ControlMode::Auto, inputs.nav));
        }

        let mut output = handler_for(self.mode).update(inputs, &mut self.data);

        if let ModeOutput::Fallback(target) = output {
            self.scan_is_fallback = target == ControlMode::Scan;
            change = Some(self.switch_keeping_arm(target, inputs.nav));
            output = handler_for(self.mode).update(inputs, &mut self.data);
        }

        if handler_for(self.mode).arms_output() && !self.armed {
            output = ModeOutput::Neutral;
        }

        ModeStep { output, change }
    }

    fn transition(&mut self, to: ControlMode, nav: &NavStatus) -> ModeChange {
        let handler = handler_for(to);
        let change = self.switch_keeping_arm(to, nav);
        self.armed = handler.arms_output();
        ModeChange {
            armed: self.armed,
            ..change
        }
    }

    /// Automatic switches keep whatever arming state the operator chose.
    fn switch_keeping_arm(&mut self, to: ControlMode, nav: &NavStatus) -> ModeChange {
        let from = self.mode;
        handler_for(to).enter(&mut self.data, nav);
        self.mode = to;
        ModeChange {
            from,
            to,
            armed: self.armed,
        }
    }
}
