//! Structured errors for the marquee HTTP server.
//!
//! Cache failures never show up here; the cache layer absorbs them. These are
//! the errors a search caller can actually see.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marquee_client::TmdbError;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A rejected query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub param: String,
    pub error: String,
}

impl FieldError {
    pub fn new(param: &str, error: &str) -> Self {
        Self { param: param.to_string(), error: error.to_string() }
    }
}

/// Message shown when the catalog fetch fails.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Structured errors for the marquee HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more query parameters failed validation.
    #[error("INVALID_INPUT: {} invalid parameter(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A single malformed parameter outside the search route.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The movie catalog could not answer.
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(#[from] TmdbError),

    /// The backing store could not answer a read that has no fallback.
    #[error("STORE_UNAVAILABLE: {0}")]
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response(),
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "catalog fetch failed");
                let body = json!({ "data": [], "error": UPSTREAM_FAILURE_MESSAGE });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            ApiError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "cache store unavailable" }))).into_response()
            }
        }
    }
}

impl From<marquee_core::Error> for ApiError {
    fn from(err: marquee_core::Error) -> Self {
        match err {
            marquee_core::Error::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation = ApiError::Validation(vec![FieldError::new("page", "bad")]).into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let upstream = ApiError::Upstream(TmdbError::RateLimited).into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let unavailable = ApiError::Unavailable("closed".into()).into_response();
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_from_core_error() {
        let invalid: ApiError = marquee_core::Error::InvalidInput("date".into()).into();
        assert!(matches!(invalid, ApiError::InvalidInput(_)));

        let encoding: ApiError = marquee_core::Error::Encoding("x".into()).into();
        assert!(matches!(encoding, ApiError::Unavailable(_)));
    }
}
