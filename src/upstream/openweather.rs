//! OpenWeather API client.

use crate::error::FetchError;
use crate::upstream::{GeoLocation, Units, WeatherProvider};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Geocoding API result entry.
#[derive(Debug, Deserialize)]
struct GeoResult {
    lat: f64,
    lon: f64,
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    geo_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Builds a client with a bounded per-request timeout. A request that
    /// exceeds it is classified as an upstream error, never retried.
    pub fn new(
        base_url: &str,
        geo_url: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Config(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            geo_url: geo_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Resolves a city name to coordinates via the Geocoding API.
    /// Consumed by callers before a coordinate fetch; not part of the
    /// cache/lock path.
    pub async fn geocode_city(&self, city: &str) -> Result<GeoLocation, FetchError> {
        let url = format!("{}/direct", self.geo_url);
        debug!("Geocoding city: {}", city);
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(classify_transport)?;

        let results: Vec<GeoResult> = read_json(response).await?;
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::CityNotFound(city.to_string()))?;

        Ok(GeoLocation {
            lat: first.lat,
            lon: first.lon,
            name: first.name.unwrap_or_else(|| city.to_string()),
            country: first.country.unwrap_or_default(),
        })
    }

    async fn get_data(
        &self,
        endpoint: &str,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Upstream GET {} lat={} lon={} units={}", url, lat, lon, units);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", units.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        read_json(response).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64, units: Units) -> Result<Value, FetchError> {
        self.get_data("weather", lat, lon, units).await
    }

    async fn forecast(&self, lat: f64, lon: f64, units: Units) -> Result<Value, FetchError> {
        self.get_data("forecast", lat, lon, units).await
    }
}

/// Maps connect/timeout/body errors, which carry no HTTP status, to the
/// gateway error class.
fn classify_transport(e: reqwest::Error) -> FetchError {
    let body = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    warn!("Upstream transport error: {}", body);
    FetchError::Upstream { status: None, body }
}

/// Checks the status and decodes the body, keeping upstream status/body in
/// the error when the call failed.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Upstream HTTP {}: {}", status.as_u16(), body);
        return Err(FetchError::Upstream {
            status: Some(status.as_u16()),
            body,
        });
    }
    response.json::<T>().await.map_err(|e| FetchError::Upstream {
        status: Some(status.as_u16()),
        body: format!("undecodable upstream body: {}", e),
    })
}
