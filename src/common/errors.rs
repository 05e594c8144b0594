//! Error types for the application

use thiserror::Error;

/// Result type alias using our PusherError
pub type Result<T> = std::result::Result<T, PusherError>;

/// Coarse classification of an error, used for logging and for deciding
/// how the scheduler recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Price feed could not be fetched or understood; the tick is skipped
    Fetch,
    /// No successful fetch has happened yet
    CacheEmpty,
    /// The notifier rejected or timed out on a payload
    Dispatch,
    /// Startup configuration is unusable
    Configuration,
    /// Anything else
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Fetch => "fetch",
            ErrorKind::CacheEmpty => "cache_empty",
            ErrorKind::Dispatch => "dispatch",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Main error type for the price pusher
#[derive(Error, Debug)]
pub enum PusherError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Exchange answered with something we cannot turn into snapshots
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Read before the first successful fetch
    #[error("No prices have been fetched yet")]
    CacheEmpty,

    /// Notifier failed to deliver a payload
    #[error("Notification dispatch failed: {0}")]
    Dispatch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PusherError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PusherError::HttpRequest(_)
            | PusherError::JsonParse(_)
            | PusherError::InvalidResponse(_)
            | PusherError::Timeout(_) => ErrorKind::Fetch,
            PusherError::CacheEmpty => ErrorKind::CacheEmpty,
            PusherError::Dispatch(_) => ErrorKind::Dispatch,
            PusherError::Configuration(_) => ErrorKind::Configuration,
            PusherError::Internal(_) => ErrorKind::Internal,
        }
    }
}
