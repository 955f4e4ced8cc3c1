//! Periodic stats polling
//!
//! The first tick fires one full period after creation, not immediately.
//! Missed ticks are delayed rather than burst, so a stalled loop never
//! floods the backend with queued requests.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Ticker for `system_stats` requests
pub struct StatsPoller {
    ticker: Option<Interval>,
}

impl StatsPoller {
    /// `None` builds a poller that never ticks
    pub fn new(period: Option<Duration>) -> Self {
        let ticker = period.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self { ticker }
    }

    /// Wait for the next tick; pends forever when disabled
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ticker.is_some()
    }
}
