use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Spacing between requests for a requests-per-minute ceiling
pub fn request_interval(max_requests_per_minute: u32) -> Duration {
    Duration::from_secs(60) / max_requests_per_minute.max(1)
}

/// Shared limiter that releases at most one request per interval
#[derive(Debug)]
pub struct RateLimiter {
    ticks: Mutex<Interval>,
}

impl RateLimiter {
    pub fn per_minute(max_requests_per_minute: u32) -> Self {
        Self::with_interval(request_interval(max_requests_per_minute))
    }

    pub fn with_interval(period: Duration) -> Self {
        let mut ticks = tokio::time::interval_at(Instant::now(), period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticks: Mutex::new(ticks),
        }
    }

    /// Waits until the next request may start
    pub async fn acquire(&self) {
        self.ticks.lock().await.tick().await;
    }
}
