//! Boot-relative clock.
//!
//! Every timestamp in the tracker is a `u64` count of microseconds since
//! boot. Report ages, timeouts and tick deadlines are all differences of
//! two such readings.

use core::cell::Cell;

/// Source of boot-relative timestamps.
///
/// ```
/// use antenna_tracker_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let fix_received = time.now_us();
/// time.advance(20_000);
/// assert_eq!(time.elapsed_since(fix_received), 20_000);
/// ```
pub trait TimeSource: Clone + Send + Sync {
    fn now_us(&self) -> u64;

    fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }

    /// Age of a timestamp taken from this clock. A stamp from the future
    /// (clock reset, foreign source) reads as zero age.
    fn elapsed_since(&self, stamp_us: u64) -> u64 {
        self.now_us().saturating_sub(stamp_us)
    }
}

impl<T: TimeSource> TimeSource for &T {
    fn now_us(&self) -> u64 {
        T::now_us(self)
    }
}

/// Hand-cranked clock for tests.
///
/// Handed out as `&MockTime` so the test body, the scheduler and the tracker
/// read one instant, and a task under test can advance it to fake its own
/// run time.
#[derive(Clone, Default)]
pub struct MockTime {
    now: Cell<u64>,
}

// Safety: only driven from single-threaded tests.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(us: u64) -> Self {
        Self { now: Cell::new(us) }
    }

    pub fn set(&self, us: u64) {
        self.now.set(us);
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get().saturating_add(us));
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}
