//! Fixed-rate cooperative task scheduler
//!
//! This module provides the task table runner and its statistics without any
//! async runtime dependencies. The table is fixed at construction; table
//! order is the priority.
//!
//! # Components
//!
//! - [`types`]: Task and scheduler statistics
//! - [`runner`]: `Task` table entries and the `Scheduler`
//!
//! # Example
//!
//! ```rust
//! use antenna_tracker_core::scheduler::{Scheduler, Task};
//! use antenna_tracker_core::traits::MockTime;
//!
//! fn count(ticks: &mut u32) {
//!     *ticks += 1;
//! }
//!
//! let time = MockTime::new();
//! let tasks = [Task::new("count", count as fn(&mut u32), 1, 100)];
//! let mut scheduler = Scheduler::new(&tasks, 50).unwrap();
//! let mut ticks = 0;
//! scheduler.loop_once(&mut ticks, &time);
//! assert_eq!(ticks, 1);
//! ```

pub mod runner;
pub mod types;

pub use runner::*;
pub use types::*;
