//! Per-task and whole-loop timing counters

/// Smoothing used for the running averages: `avg = (sample + 9 * avg) / 10`
fn smooth(avg: u32, sample: u32) -> u32 {
    if avg == 0 {
        return sample;
    }
    ((sample as u64 + 9 * avg as u64) / 10) as u32
}

/// Timing history of one task table entry
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskStats {
    /// Runs completed
    pub execution_count: u64,
    pub last_execution_us: u32,
    /// Smoothed run time
    pub avg_execution_us: u32,
    pub max_execution_us: u32,
    /// Smoothed distance between the measured and the nominal run interval
    pub avg_jitter_us: u32,
    /// Runs that took longer than the task's budget
    pub deadline_misses: u32,
    /// Ticks on which the task was due but skipped because its budget no
    /// longer fitted in the tick
    pub overruns: u32,
}

impl TaskStats {
    /// Account for a completed run.
    ///
    /// `interval_us` is the time since the previous run and `nominal_us` the
    /// interval the task table asks for.
    pub fn update(&mut self, execution_us: u32, interval_us: u32, nominal_us: u32, budget_us: u32) {
        self.execution_count = self.execution_count.saturating_add(1);
        self.last_execution_us = execution_us;
        self.avg_execution_us = smooth(self.avg_execution_us, execution_us);
        self.max_execution_us = self.max_execution_us.max(execution_us);
        self.avg_jitter_us = smooth(self.avg_jitter_us, interval_us.abs_diff(nominal_us));
        if execution_us > budget_us {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }
    }

    pub fn record_overrun(&mut self) {
        self.overruns = self.overruns.saturating_add(1);
    }
}

/// Loop-wide counters, refreshed once per second of ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerStats {
    /// Share of the last window spent inside tasks, 0..=100
    pub cpu_load_percent: u8,
    pub total_deadline_misses: u32,
    pub total_overruns: u32,
    pub ticks: u64,
}

impl SchedulerStats {
    pub fn update_cpu_load(&mut self, busy_us: u64, window_us: u64) {
        if let Some(load) = (busy_us * 100).checked_div(window_us) {
            self.cpu_load_percent = load.min(100) as u8;
        }
    }

    pub fn update_deadline_misses(&mut self, tasks: &[TaskStats]) {
        self.total_deadline_misses = tasks
            .iter()
            .fold(0u32, |sum, t| sum.saturating_add(t.deadline_misses));
    }
}
