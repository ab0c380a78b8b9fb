//! Periodic content refresh
//!
//! The scheduler only decides *when* to refresh. What a refresh does is up
//! to [`crate::rotation::RotationManager::request_refresh`], which stages
//! results until it is safe to apply them.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// Default refresh period (hourly)
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60 * 60);

pub struct RefreshScheduler {
    period: Duration,
    interval: Interval,
    rounds: u64,
}

impl RefreshScheduler {
    /// First tick fires one full `period` after `start`
    pub fn new(period: Duration, start: Instant) -> Self {
        let mut interval = interval_at(start + period, period);
        // Missed ticks collapse into a single refresh
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            period,
            interval,
            rounds: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Refresh rounds started so far
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Wait for the next refresh round
    ///
    /// Cancel-safe: may be used as a `tokio::select!` branch.
    pub async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.rounds += 1;
        debug!("Refresh round {} due", self.rounds);
        self.rounds
    }
}
