//! Upstream weather data provider seam.

pub mod openweather;

pub use openweather::OpenWeatherClient;

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Unit system for upstream requests; part of every cache key so the same
/// location cached under different units never collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(format!("unsupported units: {other:?}")),
        }
    }
}

/// A place name resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub country: String,
}

/// The upstream calls the fetch orchestrator depends on.
///
/// Payloads are opaque to the core: whatever JSON the provider returns is
/// cached and handed back untouched.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, lat: f64, lon: f64, units: Units) -> Result<Value, FetchError>;

    async fn forecast(&self, lat: f64, lon: f64, units: Units) -> Result<Value, FetchError>;
}
