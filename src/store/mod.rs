//! The shared key/value store the cache and lock layers coordinate through.
//!
//! All cross-request coordination in this crate happens via the atomic
//! operations of one of these stores; the orchestrator keeps no mutable
//! state of its own, so any number of gateway processes can share a single
//! backing store safely.

pub mod memory;
pub mod redis;

use crate::error::FetchError;
use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// The four primitives the cache and refresh lock need from a backing store.
///
/// `set_nx_px` must be a single atomic check-and-set: an exists-check
/// followed by a separate set would race under concurrent callers.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Fetches the raw string stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, FetchError>;

    /// Unconditionally stores `value` under `key` with an absolute expiry
    /// of `ttl_secs` from now. Last writer wins.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), FetchError>;

    /// Atomically creates `key` with a `ttl_ms` expiry only if it is
    /// currently absent. Returns whether the entry was created.
    async fn set_nx_px(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool, FetchError>;

    /// Deletes `key` unconditionally. Returns whether an entry existed.
    async fn del(&self, key: &str) -> Result<bool, FetchError>;
}
