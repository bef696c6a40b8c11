//! Fetch orchestration: cache-aside with stampede suppression.
//!
//! Per-request state machine:
//!
//! ```text
//! CHECK_CACHE --hit--> RETURN_CACHED
//! CHECK_CACHE --miss--> ACQUIRE_LOCK
//! ACQUIRE_LOCK --fail--> Err(Busy)
//! ACQUIRE_LOCK --success--> FETCH_UPSTREAM
//! FETCH_UPSTREAM --success--> STORE_CACHE -> RELEASE_LOCK -> RETURN_FRESH
//! FETCH_UPSTREAM --failure--> RELEASE_LOCK -> Err(Upstream)
//! ```
//!
//! Exactly one upstream call per terminal transition; nothing is retried.
//! Callers that lose the lock race are not queued or coalesced onto the
//! in-flight result; each independently gets `Busy` and may retry. Under
//! sustained contention many callers receive `Busy` at once.

use crate::cache::{RefreshLock, WeatherCache};
use crate::config::Config;
use crate::coords::rounded_coords;
use crate::error::FetchError;
use crate::store::SharedStore;
use crate::upstream::{Units, WeatherProvider};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Which upstream resource a fetch targets. Each kind has its own cache
/// TTL and its own key tag, so the two never share records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Current,
    Forecast,
}

impl ResourceKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Current => "current",
            ResourceKind::Forecast => "forecast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cached,
    Fresh,
}

/// Cache metadata reported alongside every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
    pub hit: bool,
    pub age_seconds: Option<u64>,
    pub stale: bool,
}

/// A successful fetch. The busy and upstream-failure outcomes are the
/// `Err` arm of the fetch methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    pub payload: Value,
    pub origin: Origin,
    pub cache: CacheInfo,
}

/// Composes cache, refresh lock and upstream provider.
///
/// Holds no mutable state between requests; all coordination goes through
/// the shared store, so any number of fetchers (in one process or many)
/// can run against the same store side by side.
#[derive(Clone)]
pub struct WeatherFetcher {
    cache: WeatherCache,
    lock: RefreshLock,
    provider: Arc<dyn WeatherProvider>,
    config: Arc<Config>,
}

impl WeatherFetcher {
    pub fn new(
        store: Arc<dyn SharedStore>,
        provider: Arc<dyn WeatherProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            cache: WeatherCache::new(store.clone()),
            lock: RefreshLock::new(store),
            provider,
            config,
        }
    }

    pub async fn fetch_current(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<FetchResult, FetchError> {
        self.fetch(ResourceKind::Current, lat, lon, units).await
    }

    pub async fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<FetchResult, FetchError> {
        self.fetch(ResourceKind::Forecast, lat, lon, units).await
    }

    async fn fetch(
        &self,
        kind: ResourceKind,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<FetchResult, FetchError> {
        let (rlat, rlon) = rounded_coords(lat, lon, self.config.cache_coord_round_decimals);
        let key = format!("{}:{}:{}:{}", kind.tag(), units, rlat, rlon);
        let lock_key = format!("lock:{}", key);

        let cached = self.cache.get_json(&key).await?;
        if let Some(payload) = cached.payload {
            return Ok(FetchResult {
                payload,
                origin: Origin::Cached,
                cache: CacheInfo {
                    hit: true,
                    age_seconds: cached.age_seconds,
                    stale: cached.stale,
                },
            });
        }

        if !self
            .lock
            .acquire(&lock_key, self.config.refresh_lock_ttl_ms)
            .await?
        {
            debug!("Refresh already in flight for key: {}", key);
            return Err(FetchError::Busy);
        }

        // Everything fallible while the lock is held runs in `refresh` and
        // its result is captured, so release runs on every exit path.
        let refreshed = self.refresh(kind, &key, lat, lon, units).await;
        if let Err(e) = self.lock.release(&lock_key).await {
            warn!("Failed to release refresh lock {}: {}", lock_key, e);
        }
        refreshed
    }

    async fn refresh(
        &self,
        kind: ResourceKind,
        key: &str,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<FetchResult, FetchError> {
        let payload = match kind {
            ResourceKind::Current => self.provider.current(lat, lon, units).await?,
            ResourceKind::Forecast => self.provider.forecast(lat, lon, units).await?,
        };
        self.cache.set_json(key, &payload, self.ttl_for(kind)).await?;
        Ok(FetchResult {
            payload,
            origin: Origin::Fresh,
            cache: CacheInfo {
                hit: false,
                age_seconds: None,
                stale: false,
            },
        })
    }

    fn ttl_for(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Current => self.config.cache_ttl_current_secs,
            ResourceKind::Forecast => self.config.cache_ttl_forecast_secs,
        }
    }
}
