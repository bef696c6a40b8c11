//! Keyed payload cache over the shared store.
//!
//! Records are stored as JSON envelopes carrying their write time, so the
//! age of a hit can be reported without a second round trip:
//!   key -> {"stored_at": <unix seconds>, "payload": {...}}

pub mod lock;

pub use lock::RefreshLock;

use crate::error::FetchError;
use crate::store::SharedStore;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// The persisted envelope for one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub stored_at: i64,
    pub payload: Value,
}

/// Outcome of a cache read.
///
/// `stale` is a declared extension point for serving just-expired data;
/// it is always reported `false` today.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub hit: bool,
    pub payload: Option<Value>,
    pub age_seconds: Option<u64>,
    pub stale: bool,
}

impl CacheLookup {
    fn miss() -> Self {
        CacheLookup {
            hit: false,
            payload: None,
            age_seconds: None,
            stale: false,
        }
    }
}

/// Cache layer over a [`SharedStore`].
#[derive(Clone)]
pub struct WeatherCache {
    store: Arc<dyn SharedStore>,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Reads the record under `key`.
    ///
    /// An absent key and a record that fails to decode are both reported as
    /// a miss: corruption degrades to a cold fetch instead of failing the
    /// request. Age is clamped to zero to absorb clock skew between the
    /// record's writer and this reader.
    pub async fn get_json(&self, key: &str) -> Result<CacheLookup, FetchError> {
        let raw = match self.store.get(key).await? {
            Some(raw) => raw,
            None => {
                debug!("Cache MISS for key: {}", key);
                return Ok(CacheLookup::miss());
            }
        };

        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => {
                let age = (chrono::Utc::now().timestamp() - record.stored_at).max(0) as u64;
                debug!("Cache HIT for key: {} (age {}s)", key, age);
                Ok(CacheLookup {
                    hit: true,
                    payload: Some(record.payload),
                    age_seconds: Some(age),
                    stale: false,
                })
            }
            Err(e) => {
                warn!(
                    "Discarding undecodable cache record for key {}: {}. Data: '{}'",
                    key, e, raw
                );
                Ok(CacheLookup::miss())
            }
        }
    }

    /// Overwrites any record under `key` with `payload`, expiring
    /// `ttl_secs` from now. No update-if-newer check; last writer wins.
    pub async fn set_json(
        &self,
        key: &str,
        payload: &Value,
        ttl_secs: u64,
    ) -> Result<(), FetchError> {
        let record = CacheRecord {
            stored_at: chrono::Utc::now().timestamp(),
            payload: payload.clone(),
        };
        let raw = serde_json::to_string(&record)
            .map_err(|e| FetchError::Store(format!("Cache record serialization: {}", e)))?;
        self.store.set_ex(key, &raw, ttl_secs).await?;
        debug!("Cache SETEX success for key: {} with TTL: {}s", key, ttl_secs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn cache_over(store: Arc<MemoryStore>) -> WeatherCache {
        WeatherCache::new(store)
    }

    #[tokio::test]
    async fn get_on_empty_store_is_a_miss_with_no_age() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        let lookup = cache.get_json("current:metric:51.51:-0.13").await.unwrap();
        assert_eq!(lookup, CacheLookup::miss());
    }

    #[tokio::test]
    async fn put_then_get_hits_with_age_zero() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        let payload = json!({"temp": 15});
        cache.set_json("k", &payload, 120).await.unwrap();

        let lookup = cache.get_json("k").await.unwrap();
        assert!(lookup.hit);
        assert_eq!(lookup.payload, Some(payload));
        assert!(lookup.age_seconds.unwrap() <= 1);
        assert!(!lookup.stale);
    }

    #[tokio::test(start_paused = true)]
    async fn record_is_gone_after_ttl() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        cache.set_json("k", &json!({"temp": 15}), 120).await.unwrap();

        tokio::time::advance(Duration::from_secs(121)).await;
        let lookup = cache.get_json("k").await.unwrap();
        assert!(!lookup.hit);
    }

    #[tokio::test]
    async fn undecodable_record_reads_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set_ex("k", "not json at all", 120).await.unwrap();

        let cache = cache_over(store);
        let lookup = cache.get_json("k").await.unwrap();
        assert_eq!(lookup, CacheLookup::miss());
    }

    #[tokio::test]
    async fn reported_age_follows_stored_at() {
        let store = Arc::new(MemoryStore::new());
        let record = CacheRecord {
            stored_at: chrono::Utc::now().timestamp() - 30,
            payload: json!({"temp": 15}),
        };
        store
            .set_ex("k", &serde_json::to_string(&record).unwrap(), 120)
            .await
            .unwrap();

        let cache = cache_over(store);
        let lookup = cache.get_json("k").await.unwrap();
        assert!(lookup.hit);
        assert_eq!(lookup.age_seconds, Some(30));
    }

    #[tokio::test]
    async fn future_stored_at_clamps_age_to_zero() {
        let store = Arc::new(MemoryStore::new());
        let record = CacheRecord {
            stored_at: chrono::Utc::now().timestamp() + 300,
            payload: json!({}),
        };
        store
            .set_ex("k", &serde_json::to_string(&record).unwrap(), 120)
            .await
            .unwrap();

        let cache = cache_over(store);
        let lookup = cache.get_json("k").await.unwrap();
        assert_eq!(lookup.age_seconds, Some(0));
    }

    #[tokio::test]
    async fn second_put_overwrites_wholesale() {
        let cache = cache_over(Arc::new(MemoryStore::new()));
        cache.set_json("k", &json!({"temp": 15, "wind": 3}), 120).await.unwrap();
        cache.set_json("k", &json!({"temp": 17}), 120).await.unwrap();

        let lookup = cache.get_json("k").await.unwrap();
        assert_eq!(lookup.payload, Some(json!({"temp": 17})));
    }
}
