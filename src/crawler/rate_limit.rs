//! Fixed-delay rate limiting
//!
//! Every page fetch waits the configured delay first. There is no burst
//! allowance and no adaptive backoff.

use std::time::Duration;

/// Enforces a fixed pause before each fetch
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    /// Creates a limiter pausing `delay` before every fetch
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a limiter from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// Waits the configured delay
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::trace!("Rate limiting for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
