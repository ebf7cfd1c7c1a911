// src/pipeline/gate.rs
// =============================================================================
// A named counting permit pool.
//
// Two independent gates exist for a whole run: one bounds item pages being
// fetched and parsed, the other bounds asset bodies being downloaded. They
// are created by the Orchestrator and shared by cloning the handle.
//
// Waiters are served in FIFO order (tokio's Semaphore is fair), and the
// permit goes back to the pool when the GatePermit is dropped, on every
// exit path.
// =============================================================================

use crate::error::CrawlError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    name: &'static str,
    capacity: usize,
    permits: Arc<Semaphore>,
}

/// Held for as long as the guarded work runs
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            permits: Arc::new(Semaphore::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    // Waits (suspending only this task) until a permit is free
    pub async fn acquire(&self) -> Result<GatePermit, CrawlError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CrawlError::GateClosed(self.name))?;

        debug!(
            gate = self.name,
            in_flight = self.in_flight(),
            capacity = self.capacity(),
            "permit acquired"
        );
        Ok(GatePermit { _permit: permit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let gate = ConcurrencyGate::new("asset", 2);

        let first = gate.acquire().await.unwrap();
        let second = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);

        drop(first);
        assert_eq!(gate.in_flight(), 1);
        drop(second);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_acquire_waits_at_capacity() {
        let gate = ConcurrencyGate::new("item", 1);
        let held = gate.acquire().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), gate.acquire()).await;
        assert!(waiting.is_err(), "second acquire should block");

        drop(held);
        let permit = tokio::time::timeout(Duration::from_secs(1), gate.acquire()).await;
        assert!(permit.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_permits() {
        let gate = ConcurrencyGate::new("asset", 3);
        let other = gate.clone();

        let _permit = other.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 1);
        assert_eq!(gate.capacity(), 3);
    }

    #[tokio::test]
    async fn test_permit_released_on_error_path() {
        let gate = ConcurrencyGate::new("asset", 1);

        async fn guarded(gate: &ConcurrencyGate) -> Result<(), CrawlError> {
            let _permit = gate.acquire().await?;
            Err(CrawlError::malformed("https://x", "short"))
        }

        assert!(guarded(&gate).await.is_err());
        assert_eq!(gate.in_flight(), 0);
    }
}
