pub mod settings;

pub use settings::Config;

use crate::error::FetchError;
use std::sync::Arc;

/// Loads the application configuration from the environment.
///
/// Reads a `.env` file when present, then validates that the values the
/// gateway cannot run without are actually set.
pub fn load_config() -> Result<Arc<Config>, FetchError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    if config.openweather_api_key.is_empty() {
        return Err(FetchError::Config(
            "OPENWEATHER_API_KEY cannot be empty".to_string(),
        ));
    }
    if config.redis_url.is_empty() {
        return Err(FetchError::Config("REDIS_URL cannot be empty".to_string()));
    }

    config.validate_and_log();

    Ok(Arc::new(config))
}
