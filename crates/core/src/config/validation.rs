//! Sanity checks run on a loaded [`AppConfig`].

use crate::cache::connection::is_valid_table_name;
use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted freshness window: one day.
const MAX_CACHE_TIMEOUT_MINUTES: u64 = 24 * 60;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

impl AppConfig {
    /// Reject settings the server cannot run with.
    ///
    /// Checked in field order; the first problem found is returned. A missing
    /// TMDB token only logs a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CACHE_TIMEOUT_MINUTES).contains(&self.cache_timeout) {
            return Err(invalid("cache_timeout", format!("must be 1..={MAX_CACHE_TIMEOUT_MINUTES} minutes")));
        }

        for (field, name) in
            [("cache_table_name", &self.cache_table_name), ("requests_table_name", &self.requests_table_name)]
        {
            if !is_valid_table_name(name) {
                return Err(invalid(field, "must be letters, digits and underscores, not starting with a digit"));
            }
        }
        if self.cache_table_name.eq_ignore_ascii_case(&self.requests_table_name) {
            return Err(invalid("requests_table_name", "must differ from cache_table_name"));
        }

        if !(self.tmdb_api_url.starts_with("https://") || self.tmdb_api_url.starts_with("http://")) {
            return Err(invalid("tmdb_api_url", "must be an http(s) URL"));
        }

        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", format!("must be {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS} ms")));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be blank"));
        }

        if self.tmdb_api_token.is_none() {
            tracing::warn!("tmdb_api_token is not set; catalog fetches will fail until it is");
        }

        Ok(())
    }
}
