//! Error types for Ranklens.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Website errors
    #[error("Website not found: {0}")]
    WebsiteNotFound(String),

    #[error("Website access denied: {0}")]
    WebsiteForbidden(String),

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    // Provider errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Failures raised by an SEO data provider.
///
/// Kept separate from [`Error`] so callers can distinguish "the upstream is
/// unhappy" (eligible for a stale-cache fallback) from our own faults.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider network error: {0}")]
    Network(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Provider task failed with status {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("Provider response malformed: {0}")]
    Malformed(String),

    #[error("Provider credentials missing or rejected")]
    Unauthorized,
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
