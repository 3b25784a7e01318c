//! Async wrapper around [`voxbridge_core::dedup::DedupState`].
//!
//! The decision logic is pure and lives in `voxbridge-core`; this module
//! adds the `tokio::sync::Mutex` and the bounded wait for it, mirroring the
//! original's `asyncio.Lock` guarded by `asyncio.wait_for(0.5)`.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::timeout;
use voxbridge_core::dedup::DedupState;

use crate::error::DedupTimeout;

pub const LOCK_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct Deduplicator {
    state: Mutex<DedupState>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DedupState::new()),
        }
    }

    /// Returns `Ok(true)` if `text` is a duplicate of the last-seen request
    /// within the dedup window, `Ok(false)` otherwise. `Err(DedupTimeout)` if
    /// the lock could not be acquired within [`LOCK_TIMEOUT`] — the caller
    /// should treat that as "proceed, do not dedup this one".
    pub async fn check(&self, text: &str) -> Result<bool, DedupTimeout> {
        let now = Instant::now();
        match timeout(LOCK_TIMEOUT, self.state.lock()).await {
            Ok(mut guard) => Ok(guard.check_and_update(text, now)),
            Err(_) => Err(DedupTimeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_not_duplicate() {
        let dedup = Deduplicator::new();
        assert!(!dedup.check("hello").await.unwrap());
    }

    #[tokio::test]
    async fn immediate_repeat_is_duplicate() {
        let dedup = Deduplicator::new();
        assert!(!dedup.check("hello").await.unwrap());
        assert!(dedup.check("hello").await.unwrap());
    }

    #[tokio::test]
    async fn different_text_is_not_duplicate() {
        let dedup = Deduplicator::new();
        assert!(!dedup.check("hello").await.unwrap());
        assert!(!dedup.check("world").await.unwrap());
    }
}
