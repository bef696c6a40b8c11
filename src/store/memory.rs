//! In-memory [`SharedStore`] for tests and local runs without Redis.

use crate::error::FetchError;
use crate::store::SharedStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Entries expire lazily against `tokio::time::Instant`, so tests running
/// under a paused tokio clock can advance expiry deterministically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(entry: &Entry) -> bool {
        Instant::now() < entry.expires_at
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, FetchError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|e| Self::live(e))
            .map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), FetchError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool, FetchError> {
        // Check-and-set under one guard, matching the atomicity of SET NX PX.
        let mut entries = self.entries.lock().await;
        if entries.get(key).map(Self::live).unwrap_or(false) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_millis(ttl_ms),
            },
        );
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<bool, FetchError> {
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(key).map(|e| Self::live(&e)).unwrap_or(false))
    }
}
