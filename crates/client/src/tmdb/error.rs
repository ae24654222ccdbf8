//! TMDB client error types.

use std::sync::Arc;

/// Errors from the TMDB catalog client.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    /// No API token configured.
    #[error("missing API token: TMDB_API_TOKEN not set")]
    MissingApiToken,

    /// Base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Invalid search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid page (must be 1-500).
    #[error("invalid page: must be 1-500")]
    InvalidPage,

    /// Authentication failed (invalid token).
    #[error("authentication failed: invalid API token")]
    AuthError,

    /// Rate limited by TMDB.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TmdbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { TmdbError::Timeout } else { TmdbError::Network(Arc::new(err)) }
    }
}

impl TmdbError {
    /// Map an unsuccessful status code to an error. Returns `None` for 2xx/3xx.
    pub fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        match status.as_u16() {
            401 | 403 => Some(TmdbError::AuthError),
            429 => Some(TmdbError::RateLimited),
            _ if status.is_client_error() || status.is_server_error() => {
                Some(TmdbError::HttpError { status: status.as_u16() })
            }
            _ => None,
        }
    }
}
