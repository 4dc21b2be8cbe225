//! Accumulating wall-clock timers for the classification passes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Wall-clock accumulator. [`start`](Timer::start) returns a guard; the
/// elapsed time is added when the guard drops, so timed regions compose.
#[derive(Debug, Default)]
pub struct Timer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            started: Instant::now(),
        }
    }

    /// Folds one finished region into the accumulator.
    #[inline]
    pub fn record(&self, elapsed: Duration) {
        self.total_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Accumulated time across all finished regions.
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns.load(Ordering::Relaxed))
    }

    /// Number of finished regions.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Region guard returned by [`Timer::start`].
#[must_use]
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    started: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.started.elapsed());
    }
}

/// Timers owned by one field instance.
#[derive(Debug, Default)]
pub struct FieldMetrics {
    /// Time spent classifying cells against the advancing front.
    pub classify: Timer,
}
