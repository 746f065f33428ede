//! Fixed-rate cooperative task runner
//!
//! Each base tick runs every due task in table order. A task only starts if
//! its configured worst-case cost fits in what is left of the tick;
//! otherwise it is deferred to the next tick and counted as an overrun.

use super::types::{SchedulerStats, TaskStats};
use crate::traits::TimeSource;
use heapless::Vec;

/// Maximum number of tasks in a table
pub const MAX_TASKS: usize = 32;

/// One entry of the task table
pub struct Task<C> {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,
    /// Task body, called with the shared context
    pub run: fn(&mut C),
    /// Run every N base ticks (1 = every tick)
    pub interval_ticks: u16,
    /// Worst-case execution time in microseconds
    pub budget_us: u32,
}

impl<C> Task<C> {
    pub const fn new(
        name: &'static str,
        run: fn(&mut C),
        interval_ticks: u16,
        budget_us: u32,
    ) -> Self {
        Self {
            name,
            run,
            interval_ticks,
            budget_us,
        }
    }
}

impl<C> Clone for Task<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Task<C> {}

/// Task table construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// More than [`MAX_TASKS`] entries
    TooManyTasks,
    /// A task with `interval_ticks == 0`
    ZeroInterval(&'static str),
    /// Base rate of 0 Hz
    ZeroRate,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::TooManyTasks => write!(f, "too many tasks (max {})", MAX_TASKS),
            SchedulerError::ZeroInterval(name) => write!(f, "task {} has zero interval", name),
            SchedulerError::ZeroRate => write!(f, "scheduler rate must be non-zero"),
        }
    }
}

/// Cooperative scheduler over a context `C`
pub struct Scheduler<C> {
    tasks: Vec<Task<C>, MAX_TASKS>,
    last_run_tick: Vec<u64, MAX_TASKS>,
    last_run_us: Vec<u64, MAX_TASKS>,
    stats: Vec<TaskStats, MAX_TASKS>,
    summary: SchedulerStats,
    loop_hz: u16,
    period_us: u32,
    tick_counter: u64,
    tick_start_us: u64,
    window_start_us: u64,
    window_busy_us: u64,
}

impl<C> Scheduler<C> {
    /// Build a scheduler from a fixed task table
    pub fn new(tasks: &[Task<C>], loop_hz: u16) -> Result<Self, SchedulerError> {
        if loop_hz == 0 {
            return Err(SchedulerError::ZeroRate);
        }
        if tasks.len() > MAX_TASKS {
            return Err(SchedulerError::TooManyTasks);
        }

        let mut table = Vec::new();
        let mut last_run_tick = Vec::new();
        let mut last_run_us = Vec::new();
        let mut stats = Vec::new();
        for task in tasks {
            if task.interval_ticks == 0 {
                return Err(SchedulerError::ZeroInterval(task.name));
            }
            // capacity checked above
            let _ = table.push(*task);
            let _ = last_run_tick.push(0);
            let _ = last_run_us.push(0);
            let _ = stats.push(TaskStats::default());
        }

        Ok(Self {
            tasks: table,
            last_run_tick,
            last_run_us,
            stats,
            summary: SchedulerStats::default(),
            loop_hz,
            period_us: 1_000_000 / loop_hz as u32,
            tick_counter: 0,
            tick_start_us: 0,
            window_start_us: 0,
            window_busy_us: 0,
        })
    }

    /// Start a new base tick at `now_us`
    pub fn tick(&mut self, now_us: u64) {
        if self.tick_counter == 0 {
            self.window_start_us = now_us;
        }
        self.tick_counter += 1;
        self.tick_start_us = now_us;
        self.summary.ticks = self.tick_counter;
    }

    /// Run the tasks due on the current tick
    pub fn run<T: TimeSource>(&mut self, ctx: &mut C, time: &T) {
        for i in 0..self.tasks.len() {
            let task = self.tasks[i];
            let since = self.tick_counter.saturating_sub(self.last_run_tick[i]);
            if since < task.interval_ticks as u64 {
                continue;
            }

            let used = time.elapsed_since(self.tick_start_us);
            let available = (self.period_us as u64).saturating_sub(used);
            if task.budget_us as u64 > available {
                self.stats[i].record_overrun();
                self.summary.total_overruns = self.summary.total_overruns.saturating_add(1);
                continue;
            }

            let start = time.now_us();
            (task.run)(ctx);
            let execution_us = time.elapsed_since(start);

            let target_period_us = self.period_us.saturating_mul(task.interval_ticks as u32);
            let period_us = if self.stats[i].execution_count == 0 {
                target_period_us
            } else {
                start.saturating_sub(self.last_run_us[i]).min(u32::MAX as u64) as u32
            };
            self.stats[i].update(
                execution_us.min(u32::MAX as u64) as u32,
                period_us,
                target_period_us,
                task.budget_us,
            );
            self.last_run_tick[i] = self.tick_counter;
            self.last_run_us[i] = start;
            self.window_busy_us += execution_us;
        }

        if self.tick_counter % self.loop_hz as u64 == 0 {
            let now = time.now_us();
            self.summary
                .update_cpu_load(self.window_busy_us, now.saturating_sub(self.window_start_us));
            self.summary.update_deadline_misses(&self.stats);
            self.window_start_us = now;
            self.window_busy_us = 0;
        }
    }

    /// One full base tick: `tick` then `run`
    pub fn loop_once<T: TimeSource>(&mut self, ctx: &mut C, time: &T) {
        self.tick(time.now_us());
        self.run(ctx, time);
    }

    /// Deferrals across all tasks since start
    pub fn overrun_count(&self) -> u32 {
        self.summary.total_overruns
    }

    pub fn stats(&self) -> SchedulerStats {
        self.summary
    }

    pub fn task_stats(&self, index: usize) -> Option<&TaskStats> {
        self.stats.get(index)
    }

    pub fn task_name(&self, index: usize) -> Option<&'static str> {
        self.tasks.get(index).map(|t| t.name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    pub fn loop_hz(&self) -> u16 {
        self.loop_hz
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    /// Time left in the current tick
    pub fn time_available_us<T: TimeSource>(&self, time: &T) -> u64 {
        (self.period_us as u64).saturating_sub(time.elapsed_since(self.tick_start_us))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockTime;

    struct Ctx<'a> {
        time: &'a MockTime,
        log: Vec<&'static str, 64>,
        slow_cost_us: u64,
    }

    impl<'a> Ctx<'a> {
        fn new(time: &'a MockTime) -> Self {
            Self {
                time,
                log: Vec::new(),
                slow_cost_us: 100,
            }
        }
    }

    fn slow(ctx: &mut Ctx<'_>) {
        let _ = ctx.log.push("slow");
        ctx.time.advance(ctx.slow_cost_us);
    }

    fn first(ctx: &mut Ctx<'_>) {
        let _ = ctx.log.push("first");
        ctx.time.advance(100);
    }

    fn second(ctx: &mut Ctx<'_>) {
        let _ = ctx.log.push("second");
        ctx.time.advance(100);
    }

    fn heavy(ctx: &mut Ctx<'_>) {
        let _ = ctx.log.push("heavy");
        ctx.time.advance(4_000);
    }

    #[test]
    fn due_tasks_run_in_table_order() {
        let time = MockTime::new();
        let mut ctx = Ctx::new(&time);
        let tasks: [Task<Ctx<'_>>; 2] = [
            Task::new("first", first, 1, 500),
            Task::new("second", second, 1, 500),
        ];
        let mut sched = Scheduler::new(&tasks, 50).unwrap();
        sched.loop_once(&mut ctx, &time);
        assert_eq!(ctx.log.as_slice(), &["first", "second"]);
        assert_eq!(sched.overrun_count(), 0);
    }

    #[test]
    fn intervals_are_in_ticks() {
        let time = MockTime::new();
        let mut ctx = Ctx::new(&time);
        let tasks: [Task<Ctx<'_>>; 2] = [
            Task::new("first", first, 1, 500),
            Task::new("second", second, 5, 500),
        ];
        let mut sched = Scheduler::new(&tasks, 50).unwrap();
        for _ in 0..10 {
            time.set(sched.tick_counter() * 20_000);
            sched.loop_once(&mut ctx, &time);
        }
        assert_eq!(sched.task_stats(0).unwrap().execution_count, 10);
        assert_eq!(sched.task_stats(1).unwrap().execution_count, 2);
    }

    #[test]
    fn task_over_budget_is_deferred_once() {
        let time = MockTime::new();
        let mut ctx = Ctx::new(&time);
        ctx.slow_cost_us = 15_000;
        let tasks: [Task<Ctx<'_>>; 2] = [
            Task::new("slow", slow, 1, 1_000),
            Task::new("heavy", heavy, 1, 6_000),
        ];
        let mut sched = Scheduler::new(&tasks, 50).unwrap();

        sched.loop_once(&mut ctx, &time);
        assert_eq!(ctx.log.as_slice(), &["slow"]);
        assert_eq!(sched.task_stats(0).unwrap().deadline_misses, 1);
        assert_eq!(sched.task_stats(1).unwrap().overruns, 1);
        assert_eq!(sched.overrun_count(), 1);

        ctx.slow_cost_us = 100;
        time.set(20_000);
        sched.loop_once(&mut ctx, &time);
        assert_eq!(ctx.log.as_slice(), &["slow", "slow", "heavy"]);
        assert_eq!(sched.task_stats(1).unwrap().overruns, 1);
        assert_eq!(sched.task_stats(1).unwrap().execution_count, 1);
        assert_eq!(sched.overrun_count(), 1);
    }

    #[test]
    fn cpu_load_measured_per_second() {
        let time = MockTime::new();
        let mut ctx = Ctx::new(&time);
        let tasks: [Task<Ctx<'_>>; 1] = [Task::new("heavy", heavy, 1, 6_000)];
        let mut sched = Scheduler::new(&tasks, 50).unwrap();
        for tick in 0..50u64 {
            time.set(tick * 20_000);
            ctx.log.clear();
            sched.loop_once(&mut ctx, &time);
        }
        // 4 ms of every 20 ms tick
        let load = sched.stats().cpu_load_percent;
        assert!((19..=21).contains(&load), "load {}", load);
    }

    #[test]
    fn rejects_bad_tables() {
        let tasks: [Task<Ctx<'_>>; 1] = [Task::new("zero", first, 0, 100)];
        assert!(matches!(
            Scheduler::new(&tasks, 50),
            Err(SchedulerError::ZeroInterval("zero"))
        ));
        let none: [Task<Ctx<'_>>; 0] = [];
        assert!(matches!(Scheduler::new(&none, 0), Err(SchedulerError::ZeroRate)));
    }
}
