//! Cache-aside gateway for a rate-limited upstream weather provider.
//!
//! On a cold miss the fetcher takes a short advisory lock before calling
//! upstream, so a burst of identical requests produces one upstream call
//! while the rest are told to retry instead of fanning out.

pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod fetch;
pub mod store;
pub mod upstream;

pub use cache::{CacheLookup, CacheRecord, RefreshLock, WeatherCache};
pub use config::{load_config, Config};
pub use error::FetchError;
pub use fetch::{CacheInfo, FetchResult, Origin, ResourceKind, WeatherFetcher};
pub use store::{MemoryStore, RedisStore, SharedStore};
pub use upstream::{GeoLocation, OpenWeatherClient, Units, WeatherProvider};
