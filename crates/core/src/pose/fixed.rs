//! Estimators that do no fusion of their own.

use super::estimator::{Attitude, AttitudeEstimator, BaroReading, EstimatorKind};
use crate::navigation::Location;

/// Surveyed-site estimator
///
/// Reports a configured location and attitude unchanged. Used on fixed
/// installations and as the controllable pose in tests.
#[derive(Debug, Clone, Default)]
pub struct FixedPoseEstimator {
    position: Option<Location>,
    attitude: Attitude,
    baro: Option<BaroReading>,
    last_update_us: u64,
}

impl FixedPoseEstimator {
    pub fn new(position: Option<Location>, attitude: Attitude) -> Self {
        Self {
            position,
            attitude,
            baro: None,
            last_update_us: 0,
        }
    }

    pub fn set_position(&mut self, position: Option<Location>) {
        self.position = position;
    }

    pub fn set_attitude(&mut self, attitude: Attitude) {
        self.attitude = attitude;
    }

    pub fn set_baro(&mut self, baro: Option<BaroReading>) {
        self.baro = baro;
    }

    pub fn last_update_us(&self) -> u64 {
        self.last_update_us
    }
}

impl AttitudeEstimator for FixedPoseEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Fixed
    }

    fn update(&mut self, now_us: u64) {
        self.last_update_us = now_us;
    }

    fn attitude(&self) -> Attitude {
        self.attitude
    }

    fn position(&self) -> Option<Location> {
        self.position
    }

    fn baro(&self) -> Option<BaroReading> {
        self.baro
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

/// Output of an estimator running outside the tracker (flight controller
/// AHRS, IMU with on-chip fusion)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalSample {
    pub attitude: Attitude,
    pub position: Option<Location>,
    pub baro: Option<BaroReading>,
    pub timestamp_us: u64,
}

/// Estimator fed by pushed samples; unhealthy once samples stop arriving.
#[derive(Debug, Clone)]
pub struct ExternalPoseEstimator {
    kind: EstimatorKind,
    timeout_us: u64,
    sample: Option<ExternalSample>,
    healthy: bool,
}

impl ExternalPoseEstimator {
    pub fn new(kind: EstimatorKind, timeout_us: u64) -> Self {
        Self {
            kind,
            timeout_us,
            sample: None,
            healthy: false,
        }
    }

    pub fn push(&mut self, sample: ExternalSample) {
        self.sample = Some(sample);
    }
}

impl AttitudeEstimator for ExternalPoseEstimator {
    fn kind(&self) -> EstimatorKind {
        self.kind
    }

    fn update(&mut self, now_us: u64) {
        self.healthy = match &self.sample {
            Some(sample) => now_us.saturating_sub(sample.timestamp_us) < self.timeout_us,
            None => false,
        };
    }

    fn attitude(&self) -> Attitude {
        self.sample.map(|s| s.attitude).unwrap_or_default()
    }

    fn position(&self) -> Option<Location> {
        if !self.healthy {
            return None;
        }
        self.sample.and_then(|s| s.position)
    }

    fn baro(&self) -> Option<BaroReading> {
        self.sample.and_then(|s| s.baro)
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }
}
