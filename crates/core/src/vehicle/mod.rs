//! Vehicle position estimator
//!
//! Keeps the last accepted position report of the tracked vehicle and
//! dead-reckons it forward along the reported course between reports.
//! Reports older than the staleness threshold invalidate tracking and
//! freeze the estimate where it was.

use crate::navigation::{wrap_360, Location};

/// Default staleness threshold (5 s)
pub const DEFAULT_STALENESS_US: u64 = 5_000_000;

/// Position report received from the vehicle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionReport {
    pub location: Location,
    /// Course over ground, degrees
    pub heading_deg: f32,
    /// Ground speed, m/s
    pub ground_speed: f32,
    /// Vehicle's own timestamp (ms since its boot)
    pub timestamp_ms: u32,
}

/// Tracked vehicle state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// True while the last accepted report is younger than the staleness threshold
    pub location_valid: bool,
    /// Last reported location
    pub location: Location,
    /// Dead-reckoned location, refreshed every tick
    pub location_estimate: Location,
    /// Local receipt time of the last accepted report (µs)
    pub last_update_us: u64,
    /// Local receipt time of the last accepted report (ms)
    pub last_update_ms: u64,
    /// Course over ground, degrees in `[0, 360)`
    pub heading: f32,
    /// Ground speed, m/s
    pub ground_speed: f32,
    /// Source timestamp of the last accepted report
    pub source_timestamp_ms: u32,
}

/// Why a position report was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingError {
    /// Coordinates outside ±90/±180 or the 0/0 point
    ImplausibleLocation,
    /// Non-finite heading or negative/non-finite speed
    ImplausibleMotion,
    /// Source timestamp not newer than the last accepted report
    OutOfOrder,
}

impl TrackingError {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingError::ImplausibleLocation => "implausible location",
            TrackingError::ImplausibleMotion => "implausible heading or speed",
            TrackingError::OutOfOrder => "out-of-order report",
        }
    }
}

impl core::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a per-tick estimator update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// Estimate refreshed from a fresh report
    Tracking,
    /// The report went stale on this tick
    TimedOut,
    /// Nothing to track (never heard, or already stale)
    NoTarget,
}

/// Dead-reckoning estimator for the tracked vehicle
#[derive(Debug, Clone)]
pub struct VehicleEstimator {
    state: VehicleState,
    staleness_us: u64,
    has_report: bool,
}

impl VehicleEstimator {
    pub fn new(staleness_us: u64) -> Self {
        Self {
            state: VehicleState::default(),
            staleness_us,
            has_report: false,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn staleness_us(&self) -> u64 {
        self.staleness_us
    }

    pub fn set_staleness_us(&mut self, staleness_us: u64) {
        self.staleness_us = staleness_us;
    }

    /// Validate and store a position report received at `now_us`.
    pub fn handle_report(
        &mut self,
        report: &PositionReport,
        now_us: u64,
    ) -> Result<(), TrackingError> {
        if !report.location.is_plausible() {
            return Err(TrackingError::ImplausibleLocation);
        }
        if !report.heading_deg.is_finite()
            || !report.ground_speed.is_finite()
            || report.ground_speed < 0.0
        {
            return Err(TrackingError::ImplausibleMotion);
        }
        // A stale source may have rebooted, so its clock restarting is accepted.
        if self.has_report
            && !self.is_stale(now_us)
            && report.timestamp_ms <= self.state.source_timestamp_ms
        {
            return Err(TrackingError::OutOfOrder);
        }

        self.state.location = report.location;
        self.state.location_estimate = report.location;
        self.state.heading = wrap_360(report.heading_deg);
        self.state.ground_speed = report.ground_speed;
        self.state.source_timestamp_ms = report.timestamp_ms;
        self.state.last_update_us = now_us;
        self.state.last_update_ms = now_us / 1000;
        self.state.location_valid = true;
        self.has_report = true;
        Ok(())
    }

    /// Refresh the estimate for `now_us` and expire stale tracking.
    pub fn update(&mut self, now_us: u64) -> TrackingStatus {
        if !self.state.location_valid {
            return TrackingStatus::NoTarget;
        }
        if self.is_stale(now_us) {
            self.state.location_valid = false;
            return TrackingStatus::TimedOut;
        }
        self.state.location_estimate = self.estimate_at(now_us);
        TrackingStatus::Tracking
    }

    /// Extrapolated vehicle location at `now_us` without modifying state.
    pub fn estimate_at(&self, now_us: u64) -> Location {
        if !self.state.location_valid {
            return self.state.location_estimate;
        }
        let age_us = now_us.saturating_sub(self.state.last_update_us);
        if age_us == 0 {
            return self.state.location;
        }
        let age_s = age_us as f32 * 1e-6;
        let mut estimate = self.state.location;
        estimate.offset_bearing(self.state.heading, self.state.ground_speed * age_s);
        estimate
    }

    fn is_stale(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.state.last_update_us) >= self.staleness_us
    }
}

impl Default for VehicleEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_US)
    }
}
