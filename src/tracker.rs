//! Tracker controller
//!
//! One owned [`Tracker`] ties the core components to the platform
//! collaborators. The scheduler hands it to every task by `&mut`; there is no
//! global instance.
//!
//! # Data flow per tick
//!
//! ```text
//! link ──► router ──► vehicle estimator ──┐
//!                                          ├─► geometry ─► modes ─► servos ─► actuators
//! estimator ──► pose source ───────────────┘
//! ```
//!
//! Operator requests (mode changes, servo tests, home, calibration, guided
//! targets) arrive as [`TrackerCommand`]s and are acknowledged on the link.

use crate::communication::mavlink::handlers::command::{CommandHandler, HomeRequest};
use crate::communication::mavlink::handlers::{
    ParamHandler, PressureReport, StreamRates, TelemetryStreamer, TrackerCommand,
};
use crate::communication::mavlink::router::GCS_TIMEOUT_US;
use crate::communication::mavlink::{
    Inbound, MessageRouter, TrackerSnapshot, TRACKER_COMPONENT_ID, TRACKER_SYSTEM_ID,
};
use crate::communication::{LinkError, TelemetryLink};
use crate::error::TrackerError;
use crate::home::HomeStore;
use crate::platform::Platform;
use antenna_tracker_core::mode::{
    ControlMode, GuidedTarget, ManualInput, ModeChange, ModeError, ModeInputs, ModeOutput,
    ModeStateMachine,
};
use antenna_tracker_core::navigation::{compute_geometry, Location, NavStatus};
use antenna_tracker_core::parameters::{AltSource, ParameterStore, ServoParams, TrackerParams};
use antenna_tracker_core::pose::{select_index, AttitudeEstimator, EstimatorKind, TrackerPose};
use antenna_tracker_core::scheduler::SchedulerStats;
use antenna_tracker_core::servo::{Axis, ServoCommandGenerator, ServoLimits};
use antenna_tracker_core::traits::TimeSource;
use antenna_tracker_core::vehicle::{PositionReport, TrackingStatus, VehicleEstimator, VehicleState};
use heapless::Deque;
use mavlink::common::{MavCmd, MavMessage};
use mavlink::MavHeader;

/// Outbound messages held while the link is busy
pub const DEFERRED_QUEUE_LEN: usize = 8;

/// Inbound messages handled per GCS update
const MAX_INBOUND_PER_TICK: usize = 16;

/// Collaborators a tracker is built from
pub struct TrackerIo<P: Platform> {
    pub time: P::Time,
    pub actuators: P::Actuators,
    pub home_store: P::HomeStore,
    pub link: P::Link,
    /// Registered attitude estimators; one is selected at startup
    pub estimators: Vec<Box<dyn AttitudeEstimator>>,
}

impl<P: Platform> TrackerIo<P> {
    pub fn new(
        time: P::Time,
        actuators: P::Actuators,
        home_store: P::HomeStore,
        link: P::Link,
    ) -> Self {
        Self {
            time,
            actuators,
            home_store,
            link,
            estimators: Vec::new(),
        }
    }

    /// Register an attitude estimator
    pub fn with_estimator(mut self, estimator: Box<dyn AttitudeEstimator>) -> Self {
        self.estimators.push(estimator);
        self
    }
}

/// Antenna tracker controller
pub struct Tracker<P: Platform> {
    io: TrackerIo<P>,
    active_estimator: usize,

    store: ParameterStore,
    params: TrackerParams,
    servo_params: ServoParams,

    vehicle: VehicleEstimator,
    pose: TrackerPose,
    nav: NavStatus,
    modes: ModeStateMachine,
    servos: ServoCommandGenerator,
    manual: ManualInput,

    home: Option<Location>,
    ground_fix_count: u8,
    /// Vehicle height above the tracker from the last pressure report
    baro_alt_diff: Option<f32>,

    router: MessageRouter,
    param_handler: ParamHandler,
    streamer: TelemetryStreamer,
    deferred: Deque<MavMessage, DEFERRED_QUEUE_LEN>,
    dropped_messages: u32,
    sequence: u8,

    scheduler_stats: SchedulerStats,
    reported_overruns: u32,
    gcs_was_active: bool,
}

fn stream_rates(params: &TrackerParams) -> StreamRates {
    StreamRates {
        position: params.sr_position as u32,
        extra1: params.sr_extra1 as u32,
        extra3: params.sr_extra3 as u32,
    }
}

impl<P: Platform> Tracker<P> {
    /// Build a tracker from its collaborators and a parameter store.
    ///
    /// Missing parameters are registered with their defaults. The attitude
    /// estimator is chosen once from `AHRS_TYPE`, falling back to the first
    /// registered one. A home record that cannot be read is treated as unset.
    pub fn new(mut io: TrackerIo<P>, mut store: ParameterStore) -> Result<Self, TrackerError> {
        TrackerParams::register_defaults(&mut store)?;
        ServoParams::register_defaults(&mut store)?;

        let mut params = TrackerParams::from_store(&store);
        if !params.is_valid() {
            crate::log_warn!("Tracker parameters inconsistent, using defaults");
            params = TrackerParams::default();
        }
        let mut servo_params = ServoParams::from_store(&store);
        if !servo_params.is_valid() {
            crate::log_warn!("Servo parameters inconsistent, using defaults");
            servo_params = ServoParams::default();
        }

        let kinds: Vec<EstimatorKind> = io.estimators.iter().map(|e| e.kind()).collect();
        let active_estimator =
            select_index(params.ahrs_type, &kinds).ok_or(TrackerError::NoEstimator)?;
        if kinds[active_estimator] != params.ahrs_type {
            crate::log_warn!(
                "Estimator {} not registered, using {}",
                params.ahrs_type.as_str(),
                kinds[active_estimator].as_str()
            );
        }

        let home = match io.home_store.load() {
            Ok(home) => home,
            Err(err) => {
                crate::log_warn!("Stored home unreadable: {}", err);
                None
            }
        };
        if let Some(home) = home {
            crate::log_info!("Home loaded: lat={} lng={} alt_cm={}", home.lat, home.lng, home.alt_cm);
        }

        let servos = ServoCommandGenerator::new(servo_params.yaw, servo_params.pitch);
        let vehicle = VehicleEstimator::new(params.staleness_us());
        let router = MessageRouter::new(params.sysid_target);
        let streamer = TelemetryStreamer::new(stream_rates(&params));

        Ok(Self {
            io,
            active_estimator,
            store,
            params,
            servo_params,
            vehicle,
            pose: TrackerPose::new(),
            nav: NavStatus::default(),
            modes: ModeStateMachine::new(),
            servos,
            manual: ManualInput::default(),
            home,
            ground_fix_count: 0,
            baro_alt_diff: None,
            router,
            param_handler: ParamHandler::new(),
            streamer,
            deferred: Deque::new(),
            dropped_messages: 0,
            sequence: 0,
            scheduler_stats: SchedulerStats::default(),
            reported_overruns: 0,
            gcs_was_active: false,
        })
    }

    // ========== Accessors ==========

    pub fn nav_status(&self) -> &NavStatus {
        &self.nav
    }

    /// Travel-limit flags of the last servo command
    pub fn servo_limits(&self) -> ServoLimits {
        self.servos.limits()
    }

    pub fn control_mode(&self) -> ControlMode {
        self.modes.mode()
    }

    pub fn armed(&self) -> bool {
        self.modes.armed()
    }

    pub fn home(&self) -> Option<Location> {
        self.home
    }

    pub fn vehicle(&self) -> &VehicleState {
        self.vehicle.state()
    }

    pub fn pose(&self) -> &TrackerPose {
        &self.pose
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn servo_params(&self) -> &ServoParams {
        &self.servo_params
    }

    pub fn parameter_store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn io(&self) -> &TrackerIo<P> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut TrackerIo<P> {
        &mut self.io
    }

    /// Messages waiting for the link
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Messages lost because the deferred queue was full
    pub fn dropped_messages(&self) -> u32 {
        self.dropped_messages
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler_stats
    }

    pub fn record_scheduler_stats(&mut self, stats: SchedulerStats) {
        self.scheduler_stats = stats;
    }

    // ========== Inbound reports ==========

    /// Feed a vehicle position report to the estimator
    pub fn handle_position_report(&mut self, report: &PositionReport) -> Result<(), TrackerError> {
        let now = self.io.time.now_us();
        self.vehicle.handle_report(report, now).map_err(|err| {
            crate::log_warn!("Position report rejected: {}", err.as_str());
            TrackerError::from(err)
        })
    }

    /// Correlate the vehicle's pressure with the local barometer.
    ///
    /// Returns the vehicle height above the tracker. With `ALT_SOURCE = baro`
    /// the first report aligns the altitude offset so the difference reads
    /// zero.
    pub fn handle_pressure_report(&mut self, report: &PressureReport) -> Result<f32, TrackerError> {
        let diff = self
            .pose
            .baro_altitude_difference(report.pressure_pa)
            .ok_or(TrackerError::NoBarometer)?;
        self.baro_alt_diff = Some(diff);

        if self.params.alt_source == AltSource::Baro && self.nav.need_altitude_calibration {
            self.pose.set_altitude_offset(diff);
            self.nav.altitude_offset = diff;
            self.nav.need_altitude_calibration = false;
            crate::log_info!("Barometric altitude aligned, offset {}", diff);
        }
        Ok(diff)
    }

    /// Latest operator input; axes with a value take manual control
    pub fn handle_manual_control(&mut self, input: ManualInput) {
        self.manual = input;
        self.nav.manual_control_yaw = input.yaw.is_some();
        self.nav.manual_control_pitch = input.pitch.is_some();
    }

    // ========== Operator requests ==========

    /// Request a control mode. On rejection nothing changes.
    pub fn request_mode(&mut self, mode: ControlMode) -> Result<ModeChange, TrackerError> {
        let home_set = self.home.is_some();
        let change = self.modes.request(mode, home_set, &self.nav).map_err(|err| {
            crate::log_warn!("Mode {} rejected: {}", mode.name(), err.as_str());
            TrackerError::from(err)
        })?;
        self.on_mode_change(&change);
        Ok(change)
    }

    /// Request a mode by its MAVLink custom mode number
    pub fn request_custom_mode(&mut self, custom_mode: u32) -> Result<ModeChange, TrackerError> {
        let mode = ControlMode::from_custom_mode(custom_mode).ok_or_else(|| {
            crate::log_warn!("Unknown custom mode {}", custom_mode);
            TrackerError::from(ModeError::UnknownMode(custom_mode))
        })?;
        self.request_mode(mode)
    }

    /// Store a new home. Persisted first; on failure the previous home stays.
    pub fn set_home(&mut self, location: Location) -> Result<(), TrackerError> {
        if !location.is_plausible() {
            return Err(TrackerError::InvalidHome);
        }
        if let Err(err) = self.io.home_store.save(&location) {
            crate::log_warn!("Home not saved: {}", err);
            return Err(err.into());
        }
        self.home = Some(location);
        crate::log_info!(
            "Home set: lat={} lng={} alt_cm={}",
            location.lat,
            location.lng,
            location.alt_cm
        );
        Ok(())
    }

    /// Use the tracker's own position fix as home
    pub fn set_home_to_current(&mut self) -> Result<(), TrackerError> {
        if !self.pose.has_position_fix() {
            crate::log_warn!("Set home rejected: no position fix");
            return Err(TrackerError::InvalidHome);
        }
        self.set_home(self.pose.location())
    }

    /// Align the altitude offset with the vehicle's last report
    pub fn calibrate_altitude(&mut self) -> Result<f32, TrackerError> {
        let offset = self
            .pose
            .calibrate_altitude(self.vehicle.state())
            .map_err(|err| {
                crate::log_warn!("Altitude calibration failed: {}", err.as_str());
                TrackerError::from(err)
            })?;
        self.nav.altitude_offset = offset;
        self.nav.need_altitude_calibration = false;
        crate::log_info!("Altitude offset calibrated: {}", offset);
        Ok(offset)
    }

    /// Drive one servo with a raw pulse. Only in SERVO_TEST.
    ///
    /// `servo` is 1 for yaw, 2 for pitch. Returns the pulse actually written
    /// after clamping to the calibrated range.
    pub fn servo_test(&mut self, servo: u8, pulse_us: u16) -> Result<u16, TrackerError> {
        if self.modes.mode() != ControlMode::ServoTest {
            return Err(ModeError::ServoTestInactive.into());
        }
        let axis = Axis::from_servo_number(servo)
            .ok_or(TrackerError::InvalidServo("servo must be 1 (yaw) or 2 (pitch)"))?;

        let applied = self.servos.set_test_pulse(axis, pulse_us);
        let command = self.servos.test_output();
        self.servos
            .write(command, self.modes.outputs_enabled(), &mut self.io.actuators);
        crate::log_debug!("Servo {} test pulse {}", servo, applied);
        Ok(applied)
    }

    /// Absolute pointing target. Only in GUIDED.
    pub fn set_guided_target(&mut self, yaw: f32, pitch: f32) -> Result<(), TrackerError> {
        self.modes
            .set_guided_target(GuidedTarget { yaw, pitch })
            .map_err(|err| {
                crate::log_warn!("Guided target rejected: {}", err.as_str());
                TrackerError::from(err)
            })
    }

    pub fn set_armed(&mut self, armed: bool) -> Result<(), TrackerError> {
        self.modes.set_armed(armed).map_err(|err| {
            crate::log_warn!("Arming rejected: {}", err.as_str());
            TrackerError::from(err)
        })?;
        crate::log_info!("Tracking output {}", if armed { "armed" } else { "disarmed" });
        self.send_heartbeat();
        Ok(())
    }

    /// Carry out a decoded operator command
    pub fn execute(&mut self, command: TrackerCommand) -> Result<(), TrackerError> {
        match command {
            TrackerCommand::SetMode(mode) => self.request_custom_mode(mode).map(|_| ()),
            TrackerCommand::SetServo { servo, pulse_us } => {
                self.servo_test(servo, pulse_us).map(|_| ())
            }
            TrackerCommand::SetHome(HomeRequest::Current) => self.set_home_to_current(),
            TrackerCommand::SetHome(HomeRequest::Location(location)) => self.set_home(location),
            TrackerCommand::CalibrateAltitude => self.calibrate_altitude().map(|_| ()),
            TrackerCommand::MountControl { pitch, yaw } => self.set_guided_target(yaw, pitch),
            TrackerCommand::ArmDisarm(armed) => self.set_armed(armed),
        }
    }

    /// Act on one routed message, answering on the link where the protocol
    /// expects a reply
    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Position(report) => {
                // Rejections are logged by the handler
                let _ = self.handle_position_report(&report);
            }
            Inbound::Pressure(report) => {
                if let Err(err) = self.handle_pressure_report(&report) {
                    crate::log_debug!("Pressure report ignored: {}", err);
                }
            }
            Inbound::ManualControl(input) => self.handle_manual_control(input),
            Inbound::SetMode(custom_mode) => {
                let outcome = self.request_custom_mode(custom_mode).map(|_| ());
                let result = CommandHandler::result_for(&outcome);
                self.send(CommandHandler::ack(MavCmd::MAV_CMD_DO_SET_MODE, result));
            }
            Inbound::Command { command, decoded } => {
                let result = match decoded {
                    Ok(cmd) => {
                        let outcome = self.execute(cmd);
                        CommandHandler::result_for(&outcome)
                    }
                    Err(result) => result,
                };
                self.send(CommandHandler::ack(command, result));
            }
            Inbound::ParamRequestList => self.param_handler.handle_request_list(),
            Inbound::ParamRequestRead(data) => {
                if let Some(message) = self.param_handler.handle_request_read(&self.store, &data) {
                    self.send(message);
                }
            }
            Inbound::ParamSet(data) => {
                match self.param_handler.handle_set(&mut self.store, &data) {
                    Ok(message) => {
                        self.apply_parameters();
                        self.send(message);
                    }
                    Err(err) => crate::log_warn!("PARAM_SET rejected: {}", err.as_str()),
                }
            }
        }
    }

    /// Reload parameter blocks from the store and apply them live.
    ///
    /// An inconsistent block is ignored and the running values stay. The
    /// estimator selection and the scheduler rate are fixed at startup.
    pub fn apply_parameters(&mut self) {
        let params = TrackerParams::from_store(&self.store);
        if params.is_valid() {
            self.vehicle.set_staleness_us(params.staleness_us());
            self.streamer.update_rates(stream_rates(&params));
            self.router.set_target(params.sysid_target);
            self.params = params;
        } else {
            crate::log_warn!("Tracker parameters inconsistent, keeping previous values");
        }

        let servo_params = ServoParams::from_store(&self.store);
        if !servo_params.is_valid() {
            crate::log_warn!("Servo parameters inconsistent, keeping previous values");
        } else if servo_params != self.servo_params {
            self.servos.reconfigure(servo_params.yaw, servo_params.pitch);
            self.servo_params = servo_params;
        }
    }

    // ========== Scheduler tasks ==========

    /// Sample the estimator and advance the vehicle estimate
    pub fn update_pose(&mut self) {
        let now = self.io.time.now_us();
        if let Some(estimator) = self.io.estimators.get_mut(self.active_estimator) {
            estimator.update(now);
            self.pose.refresh(&**estimator, self.home);
        }

        if self.vehicle.update(now) == TrackingStatus::TimedOut {
            crate::log_warn!("Vehicle position timed out");
        }
    }

    /// Drain inbound messages from the link
    pub fn gcs_update(&mut self) {
        for _ in 0..MAX_INBOUND_PER_TICK {
            let Some((header, message)) = self.io.link.receive() else {
                break;
            };
            let now = self.io.time.now_us();
            if let Some(inbound) = self.router.route(&header, &message, now) {
                self.handle_inbound(inbound);
            }
        }
    }

    /// Geometry, mode step and servo output for one tick
    pub fn update_tracking(&mut self) {
        self.update_geometry();

        let mut inputs = ModeInputs {
            nav: &mut self.nav,
            vehicle_valid: self.vehicle.state().location_valid,
            manual: self.manual,
            trims: self.params.trims(),
            scan_config: self.params.scan_config(),
            fallback: self.params.auto_fallback,
        };
        let step = self.modes.update(&mut inputs);
        if let Some(change) = step.change {
            self.on_mode_change(&change);
        }

        let command = match step.output {
            ModeOutput::Track { yaw, pitch } => self.servos.command(
                yaw,
                pitch,
                (self.pose.heading(), self.pose.pitch()),
                self.params.tick_dt(),
            ),
            ModeOutput::Passthrough => self.servos.test_output(),
            // Fallbacks are resolved inside the state machine
            ModeOutput::Neutral | ModeOutput::Fallback(_) => self.servos.neutral(),
        };
        self.servos
            .write(command, self.modes.outputs_enabled(), &mut self.io.actuators);
    }

    fn update_geometry(&mut self) {
        let mut vehicle = self.vehicle.state().location_estimate;
        if !vehicle.is_plausible() {
            return;
        }

        let tracker_alt = self.pose.altitude();
        if self.params.alt_source == AltSource::Baro {
            if let Some(diff) = self.baro_alt_diff {
                vehicle.alt_cm = ((tracker_alt + diff) * 100.0) as i32;
            }
        }

        let pitch_cfg = self.servos.axis_config(Axis::Pitch);
        let pitch_range = (pitch_cfg.min_deg, pitch_cfg.max_deg);
        let offset = self.pose.altitude_offset();
        let geometry = compute_geometry(
            &self.pose.location(),
            tracker_alt,
            &vehicle,
            offset,
            self.nav.pitch,
            pitch_range,
        );
        self.nav.apply(&geometry, offset);
    }

    /// Establish home from the own position fix and leave INITIALISING
    pub fn update_home(&mut self) {
        if self.home.is_none() {
            self.count_ground_fixes();
        }

        if let Some(change) = self.modes.complete_initialisation(
            self.params.initial_mode,
            self.home.is_some(),
            &self.nav,
        ) {
            self.on_mode_change(&change);
        }
    }

    fn count_ground_fixes(&mut self) {
        let location = self.pose.location();
        if !self.pose.has_position_fix() || !location.is_plausible() {
            self.ground_fix_count = 0;
            return;
        }

        self.ground_fix_count = self.ground_fix_count.saturating_add(1);
        if self.ground_fix_count < self.params.ground_start_count {
            return;
        }

        self.home = Some(location);
        crate::log_info!(
            "Home from position fix: lat={} lng={} alt_cm={}",
            location.lat,
            location.lng,
            location.alt_cm
        );
        if let Err(err) = self.io.home_store.save(&location) {
            crate::log_warn!("Home not persisted: {}", err);
        }
    }

    /// Stream telemetry and continue a parameter list download
    pub fn gcs_data_stream_send(&mut self) {
        let now = self.io.time.now_us();
        let snapshot = self.snapshot(now);
        for message in self.streamer.update(&snapshot, now) {
            self.send(message);
        }

        if self.param_handler.list_in_progress() {
            for message in self.param_handler.next_list_batch(&self.store) {
                self.send(message);
            }
        }
    }

    /// Retry messages the link refused earlier, oldest first
    pub fn gcs_retry_deferred(&mut self) {
        while let Some(message) = self.deferred.pop_front() {
            if self.transmit(&message).is_err() {
                // Just popped, so there is room again
                let _ = self.deferred.push_front(message);
                break;
            }
        }
    }

    /// Slow housekeeping and health reporting
    pub fn one_second_loop(&mut self) {
        let now = self.io.time.now_us();

        let overruns = self.scheduler_stats.total_overruns;
        if overruns > self.reported_overruns {
            crate::log_warn!(
                "Scheduler overruns: {} (+{})",
                overruns,
                overruns - self.reported_overruns
            );
            self.reported_overruns = overruns;
        }

        if !self.pose.is_healthy() {
            crate::log_warn!("Attitude estimator unhealthy");
        }

        let gcs_active = self.router.connection().is_active(now, GCS_TIMEOUT_US);
        if self.gcs_was_active && !gcs_active {
            crate::log_warn!("GCS heartbeat lost");
        }
        self.gcs_was_active = gcs_active;
    }

    // ========== Outbound ==========

    /// State for the telemetry streamer
    pub fn snapshot(&self, now_us: u64) -> TrackerSnapshot {
        let attitude = self.pose.attitude();
        let mode = self.modes.mode();
        let armed = self.modes.armed();
        let relative_alt_m = self
            .home
            .map_or(0.0, |home| self.pose.altitude() - home.alt_m());

        TrackerSnapshot {
            uptime_us: now_us,
            mode,
            armed,
            status: TrackerSnapshot::status_for(mode, armed),
            attitude_deg: (attitude.roll_deg(), attitude.pitch_deg(), attitude.yaw_deg()),
            location: self.pose.location(),
            relative_alt_m,
            has_position_fix: self.pose.has_position_fix(),
            bearing: self.nav.bearing,
            distance: self.nav.distance,
            pitch: self.nav.pitch,
            altitude_difference: self.nav.altitude_difference,
            vehicle_valid: self.vehicle.state().location_valid,
            servo: self.servos.last_command(),
            cpu_load_percent: self.scheduler_stats.cpu_load_percent as f32,
            overruns: self.scheduler_stats.total_overruns,
            deferred_messages: self.deferred.len() as u16,
        }
    }

    fn on_mode_change(&mut self, change: &ModeChange) {
        crate::log_info!(
            "Mode {} -> {} ({})",
            change.from.name(),
            change.to.name(),
            if change.armed { "armed" } else { "disarmed" }
        );
        if change.from == ControlMode::ServoTest && change.to != ControlMode::ServoTest {
            self.servos.clear_test_pulses();
        }
        self.send_heartbeat();
    }

    fn send_heartbeat(&mut self) {
        let snapshot = self.snapshot(self.io.time.now_us());
        self.send(TelemetryStreamer::build_heartbeat(&snapshot));
    }

    /// Send now, or queue behind earlier messages the link refused
    fn send(&mut self, message: MavMessage) {
        if !self.deferred.is_empty() {
            self.defer(message);
            return;
        }
        if let Err(err) = self.transmit(&message) {
            crate::log_debug!("Telemetry deferred: {}", err);
            self.defer(message);
        }
    }

    fn transmit(&mut self, message: &MavMessage) -> Result<(), LinkError> {
        let header = MavHeader {
            system_id: TRACKER_SYSTEM_ID,
            component_id: TRACKER_COMPONENT_ID,
            sequence: self.sequence,
        };
        self.io.link.send(&header, message)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(())
    }

    fn defer(&mut self, message: MavMessage) {
        if self.deferred.is_full() {
            let _ = self.deferred.pop_front();
            self.dropped_messages = self.dropped_messages.wrapping_add(1);
            crate::log_warn!("Deferred telemetry full, dropped {}", self.dropped_messages);
        }
        let _ = self.deferred.push_back(message);
    }
}
