//! Periodic tick source for gauge sampling.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Fixed-period tick schedule.
///
/// The first tick fires one full period after the interval is created.
/// Ticks missed while the collector was busy are skipped, never replayed in a
/// burst.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    /// Creates a schedule. `period` must be non-zero.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the tick stream. Must be called inside a tokio runtime.
    pub fn start(&self) -> Interval {
        let mut ticks = interval_at(Instant::now() + self.period, self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticks
    }
}
