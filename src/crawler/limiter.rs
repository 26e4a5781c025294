//! Bound on concurrently processed articles

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Caps the number of article fetch-and-parse jobs in flight
///
/// Clones share the same permits.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Runs `fut` once a permit is available
    ///
    /// The permit is held until `fut` completes and is released on every
    /// exit path, including cancellation and panics.
    pub async fn run<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        // The semaphore is never closed, so acquiring cannot fail
        let _permit = self.semaphore.acquire().await.ok();
        fut.await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
