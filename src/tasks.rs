//! Scheduler task table
//!
//! The tracker runs as a fixed table of tasks over one [`Tracker`]. Order
//! matters: the pose is sampled and inbound telemetry drained before the
//! control step uses them, and telemetry goes out after it.
//!
//! | Task                   | Every (ticks) | Budget (µs) |
//! |------------------------|---------------|-------------|
//! | `update_pose`          | 1             | 1000        |
//! | `gcs_update`           | 1             | 1700        |
//! | `update_tracking`      | 1             | 1000        |
//! | `update_home`          | 5             | 4000        |
//! | `gcs_data_stream_send` | 1             | 3000        |
//! | `gcs_retry_deferred`   | 1             | 1000        |
//! | `one_second_loop`      | 50            | 3900        |

use crate::error::TrackerError;
use crate::platform::Platform;
use crate::tracker::Tracker;
use antenna_tracker_core::scheduler::{Scheduler, Task};

/// Number of entries in the tracker task table
pub const TASK_COUNT: usize = 7;

/// The tracker's task table
pub fn scheduler_tasks<P: Platform>() -> [Task<Tracker<P>>; TASK_COUNT] {
    [
        Task::new("update_pose", Tracker::<P>::update_pose, 1, 1000),
        Task::new("gcs_update", Tracker::<P>::gcs_update, 1, 1700),
        Task::new("update_tracking", Tracker::<P>::update_tracking, 1, 1000),
        Task::new("update_home", Tracker::<P>::update_home, 5, 4000),
        Task::new("gcs_data_stream_send", Tracker::<P>::gcs_data_stream_send, 1, 3000),
        Task::new("gcs_retry_deferred", Tracker::<P>::gcs_retry_deferred, 1, 1000),
        Task::new("one_second_loop", Tracker::<P>::one_second_loop, 50, 3900),
    ]
}

/// A tracker together with the scheduler that drives it
pub struct TrackerRunner<P: Platform> {
    scheduler: Scheduler<Tracker<P>>,
    tracker: Tracker<P>,
}

impl<P: Platform> TrackerRunner<P> {
    /// Build the scheduler at the tracker's `SCHED_LOOP_HZ`
    pub fn new(tracker: Tracker<P>) -> Result<Self, TrackerError> {
        let loop_hz = tracker.params().loop_hz;
        let scheduler = Scheduler::new(&scheduler_tasks::<P>(), loop_hz)?;
        crate::log_info!("Scheduler started: {} tasks at {} Hz", scheduler.len(), loop_hz);
        Ok(Self { scheduler, tracker })
    }

    /// Run one base tick
    pub fn tick(&mut self) {
        let time = self.tracker.io().time.clone();
        self.scheduler.loop_once(&mut self.tracker, &time);
        self.tracker.record_scheduler_stats(self.scheduler.stats());
    }

    pub fn tracker(&self) -> &Tracker<P> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker<P> {
        &mut self.tracker
    }

    pub fn scheduler(&self) -> &Scheduler<Tracker<P>> {
        &self.scheduler
    }

    /// Base tick length in microseconds
    pub fn period_us(&self) -> u32 {
        self.scheduler.period_us()
    }
}
