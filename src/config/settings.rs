use log::info;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub openweather_geo_url: String,
    pub redis_url: String,
    pub cache_ttl_current_secs: u64,
    pub cache_ttl_forecast_secs: u64,
    pub cache_coord_round_decimals: u32,
    pub refresh_lock_ttl_ms: u64,
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            openweather_api_key: env::var("OPENWEATHER_API_KEY").unwrap_or_default(),
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string()),
            openweather_geo_url: env::var("OPENWEATHER_GEO_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/geo/1.0".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379/0".to_string()),
            cache_ttl_current_secs: env::var("CACHE_TTL_CURRENT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            cache_ttl_forecast_secs: env::var("CACHE_TTL_FORECAST_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            cache_coord_round_decimals: env::var("CACHE_COORD_ROUND_DECIMALS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            refresh_lock_ttl_ms: env::var("REFRESH_LOCK_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn validate_and_log(&self) {
        info!(
            "Config: base_url={}, redis_url={}, ttl_current={}s, ttl_forecast={}s, \
             round_decimals={}, lock_ttl={}ms, upstream_timeout={}s",
            self.openweather_base_url,
            self.redis_url,
            self.cache_ttl_current_secs,
            self.cache_ttl_forecast_secs,
            self.cache_coord_round_decimals,
            self.refresh_lock_ttl_ms,
            self.upstream_timeout_secs,
        );
    }
}
