use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

use crate::errors::AppError;

/// Throttles calls to the market data provider.
///
/// Caps in-flight requests with a semaphore and spaces request starts by
/// `60s / requests_per_minute`.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    next_slot: Mutex<Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / requests_per_minute.max(1) as u64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            next_slot: Mutex::new(Instant::now()),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Waits for a concurrency permit and for this caller's start slot.
    ///
    /// Slots are reserved under the lock and slept on outside it, so concurrent
    /// callers queue up behind each other instead of all waking at once.
    pub async fn acquire(&self) -> Result<RateLimitGuard, AppError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::External(format!("rate limiter closed: {}", e)))?;

        let start_at = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.min_delay;
            slot
        };

        let now = Instant::now();
        if start_at > now {
            sleep(start_at - now).await;
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Releases the concurrency permit on drop
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}
