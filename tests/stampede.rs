//! Stampede suppression under a burst of identical cold requests:
//! exactly one caller reaches the upstream, the rest are turned away
//! with a retryable busy classification.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use weather_gateway::{
    Config, FetchError, MemoryStore, Origin, Units, WeatherFetcher, WeatherProvider,
};

/// Provider that holds every call open for a while, keeping the refresh
/// lock occupied so the rest of the burst lands while it is in flight.
struct SlowProvider {
    calls: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl WeatherProvider for SlowProvider {
    async fn current(&self, _lat: f64, _lon: f64, _units: Units) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(json!({"temp": 15}))
    }

    async fn forecast(&self, _lat: f64, _lon: f64, _units: Units) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(json!({"list": []}))
    }
}

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        openweather_api_key: "test-key".to_string(),
        openweather_base_url: "http://localhost".to_string(),
        openweather_geo_url: "http://localhost".to_string(),
        redis_url: String::new(),
        cache_ttl_current_secs: 120,
        cache_ttl_forecast_secs: 900,
        cache_coord_round_decimals: 2,
        refresh_lock_ttl_ms: 10_000,
        upstream_timeout_secs: 5,
    })
}

#[tokio::test(start_paused = true)]
async fn burst_of_cold_callers_yields_one_upstream_call() {
    let provider = Arc::new(SlowProvider {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(200),
    });
    let fetcher = WeatherFetcher::new(
        Arc::new(MemoryStore::new()),
        provider.clone(),
        test_config(),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let fetcher = fetcher.clone();
        handles.push(tokio::spawn(async move {
            fetcher.fetch_current(51.5074, -0.1278, Units::Metric).await
        }));
    }

    let mut fresh = 0;
    let mut busy = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(result) => {
                assert_eq!(result.origin, Origin::Fresh);
                assert_eq!(result.payload, json!({"temp": 15}));
                fresh += 1;
            }
            Err(FetchError::Busy) => busy += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(fresh, 1);
    assert_eq!(busy, 7);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn burst_after_refresh_completes_is_served_from_cache() {
    let provider = Arc::new(SlowProvider {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(10),
    });
    let fetcher = WeatherFetcher::new(
        Arc::new(MemoryStore::new()),
        provider.clone(),
        test_config(),
    );

    let warmup = fetcher
        .fetch_current(51.5074, -0.1278, Units::Metric)
        .await
        .unwrap();
    assert_eq!(warmup.origin, Origin::Fresh);

    for _ in 0..8 {
        let result = fetcher
            .fetch_current(51.5074, -0.1278, Units::Metric)
            .await
            .unwrap();
        assert_eq!(result.origin, Origin::Cached);
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn distinct_keys_refresh_in_parallel() {
    let provider = Arc::new(SlowProvider {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(200),
    });
    let fetcher = WeatherFetcher::new(
        Arc::new(MemoryStore::new()),
        provider.clone(),
        test_config(),
    );

    let london = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.fetch_current(51.5074, -0.1278, Units::Metric).await })
    };
    let paris = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.fetch_current(48.8566, 2.3522, Units::Metric).await })
    };

    assert_eq!(london.await.unwrap().unwrap().origin, Origin::Fresh);
    assert_eq!(paris.await.unwrap().unwrap().origin, Origin::Fresh);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
