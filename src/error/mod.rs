use thiserror::Error;

/// Classified failure modes of a fetch, as seen by the routing layer.
///
/// Every failure in the core is mapped into exactly one of these before it
/// is returned; nothing is retried internally. Cache-record corruption is
/// deliberately absent: a record that fails to decode is downgraded to a
/// cache miss inside the cache layer and never reaches the caller.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Location resolution failed (unknown place name)
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// The upstream provider call failed: HTTP error, network error or timeout
    #[error("Upstream error{}: {body}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, body: String },

    /// Another request holds the refresh lock for this key; retry shortly
    #[error("Refresh in progress, try again")]
    Busy,

    /// Shared cache/lock store transport failure
    #[error("Store Error: {0}")]
    Store(String),

    /// Configuration errors (startup only)
    #[error("Config Error: {0}")]
    Config(String),
}

impl FetchError {
    /// True for failures a caller may simply retry after a short delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Busy)
    }

    /// The HTTP status class a routing layer should map this error to.
    pub fn http_status(&self) -> u16 {
        match self {
            FetchError::CityNotFound(_) => 400,
            FetchError::Upstream { .. } => 502,
            FetchError::Busy => 503,
            FetchError::Store(_) | FetchError::Config(_) => 500,
        }
    }
}
