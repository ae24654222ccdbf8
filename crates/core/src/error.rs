//! Unified error types for marquee.
//!
//! Every failure inside the cache subsystem ends up here. Callers on the
//! request path log these and fall back to a miss; they never abort a search.

use tokio_rusqlite::rusqlite;

/// Unified error type for the cache subsystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a malformed table name or date key).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Backing store call failed.
    #[error("STORE_UNAVAILABLE: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// A key or payload could not be encoded or decoded.
    #[error("ENCODING_ERROR: {0}")]
    Encoding(String),
}

impl Error {
    /// Whether this error came from the backing store rather than the caller's input.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::MigrationFailed(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("bad table".to_string());
        assert!(err.to_string().contains("INVALID_INPUT"));
        assert!(err.to_string().contains("bad table"));
    }

    #[test]
    fn test_store_unavailable_classification() {
        let closed = Error::Database(tokio_rusqlite::Error::ConnectionClosed);
        assert!(closed.is_store_unavailable());
        assert!(closed.to_string().starts_with("STORE_UNAVAILABLE"));

        assert!(Error::MigrationFailed("boom".into()).is_store_unavailable());
        assert!(!Error::Encoding("boom".into()).is_store_unavailable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err().into();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
