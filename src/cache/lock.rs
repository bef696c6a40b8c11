//! Advisory refresh lock over the shared store.
//!
//! The lock exists purely to suppress cache stampedes: on a cold miss, at
//! most one caller should hit the upstream while the others are told to
//! retry. It gives no hard exclusivity guarantee.
//!
//! Known race, accepted: `release` deletes the key without checking which
//! acquisition created it. If holder A outlives its TTL and holder B then
//! acquires the same key, A's late release deletes B's entry and mutual
//! exclusion is broken for that window. Fixing this (compare-and-delete
//! with a per-acquisition token) would change observable behavior, so the
//! race is kept and documented instead.

use crate::error::FetchError;
use crate::store::SharedStore;
use log::debug;
use std::sync::Arc;

#[derive(Clone)]
pub struct RefreshLock {
    store: Arc<dyn SharedStore>,
}

impl RefreshLock {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Tries to take the lock. Succeeds only if `lock_key` is currently
    /// absent; the check-and-set is a single atomic store operation. The
    /// entry auto-expires after `ttl_ms` even if the holder crashes.
    pub async fn acquire(&self, lock_key: &str, ttl_ms: u64) -> Result<bool, FetchError> {
        let acquired = self.store.set_nx_px(lock_key, "1", ttl_ms).await?;
        debug!(
            "Lock {} for key: {}",
            if acquired { "ACQUIRED" } else { "CONTENDED" },
            lock_key
        );
        Ok(acquired)
    }

    /// Drops the lock unconditionally, whoever holds it.
    pub async fn release(&self, lock_key: &str) -> Result<(), FetchError> {
        self.store.del(lock_key).await?;
        debug!("Lock RELEASED for key: {}", lock_key);
        Ok(())
    }
}
