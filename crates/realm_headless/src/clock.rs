//! Fixed-period game clock.
//!
//! The core has no timer of its own; the host decides when a tick happens.
//! Ticks that fall behind are skipped rather than fired back to back.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Nominal tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Real-time tick source.
#[derive(Debug)]
pub struct GameClock {
    interval: Interval,
    period: Duration,
}

impl GameClock {
    /// Clock firing every `period`, first tick one period from now.
    ///
    /// A zero period is raised to one millisecond.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, period }
    }

    /// Tick period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}
