use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Paces requests to the match-data service.
///
/// Interior mutability so a single limiter can gate concurrent retrieval
/// tasks through a shared client; waiters queue on the lock and each one
/// pushes the shared deadline forward by one delay.
pub struct RateLimiter {
    delay: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            next_allowed: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut next_allowed = self.next_allowed.lock().await;
        if let Some(deadline) = *next_allowed {
            let now = Instant::now();
            if deadline > now {
                sleep_until(deadline).await;
            }
        }
        *next_allowed = Some(Instant::now() + self.delay);
    }
}
