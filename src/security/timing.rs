//! Timing equalisation for credential checks
//!
//! Login failures must not reveal whether the email exists, so every attempt
//! is padded to the same minimum wall time.

use std::time::{Duration, Instant};

/// Sleep until `min_duration` has passed since `start_time`
pub async fn add_auth_delay(start_time: Instant, min_duration: Duration) {
    let elapsed = start_time.elapsed();
    if elapsed < min_duration {
        tokio::time::sleep(min_duration - elapsed).await;
    }
}

/// Authentication timing helper
pub struct AuthTimer {
    start: Instant,
    min_duration: Duration,
}

impl AuthTimer {
    /// Create a new auth timer with minimum duration
    pub fn new(min_duration: Duration) -> Self {
        Self {
            start: Instant::now(),
            min_duration,
        }
    }

    /// Wait until minimum duration has elapsed
    pub async fn wait(self) {
        add_auth_delay(self.start, self.min_duration).await;
    }
}
