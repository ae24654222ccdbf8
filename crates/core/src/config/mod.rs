//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MARQUEE_*)
//! 2. Unprefixed deployment variables (CACHE_TIMEOUT, TMDB_API_TOKEN, ...)
//! 3. TOML config file (if MARQUEE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::Tables;
use crate::cache::connection::is_valid_table_name;

mod validation;

pub use validation::ConfigError;

/// Unprefixed variable names accepted for existing deployments.
const PLAIN_ENV_KEYS: &[&str] =
    &["CACHE_TIMEOUT", "CACHE_TABLE_NAME", "REQUESTS_TABLE_NAME", "TMDB_API_URL", "TMDB_API_TOKEN", "PORT"];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MARQUEE_*)
/// 2. Unprefixed deployment variables
/// 3. TOML config file (if MARQUEE_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Freshness window for cached results, in minutes.
    ///
    /// Set via MARQUEE_CACHE_TIMEOUT or CACHE_TIMEOUT.
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout: u64,

    /// Table holding cached catalog payloads.
    #[serde(default = "default_cache_table_name")]
    pub cache_table_name: String,

    /// Table holding the daily hit ledger.
    #[serde(default = "default_requests_table_name")]
    pub requests_table_name: String,

    /// Path to SQLite cache database.
    ///
    /// Set via MARQUEE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the TMDB API.
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB read access token, sent as a bearer token.
    ///
    /// Required only when the catalog client is built.
    #[serde(default)]
    pub tmdb_api_token: Option<String>,

    /// Interface to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// User-Agent string for catalog requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Catalog request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_timeout() -> u64 {
    2
}

fn default_cache_table_name() -> String {
    "search_cache".into()
}

fn default_requests_table_name() -> String {
    "api_requests".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./marquee-cache.sqlite")
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".into()
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_user_agent() -> String {
    "marquee/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_timeout: default_cache_timeout(),
            cache_table_name: default_cache_table_name(),
            requests_table_name: default_requests_table_name(),
            db_path: default_db_path(),
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_api_token: None,
            host: default_host(),
            port: default_port(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// How long a cached result stays eligible for lookups.
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_timeout as i64)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured backing table names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field if either name
    /// is not a plain SQL identifier, or if the two names collide.
    pub fn tables(&self) -> Result<Tables, ConfigError> {
        Tables::new(&self.cache_table_name, &self.requests_table_name).map_err(|e| {
            let field = if is_valid_table_name(&self.cache_table_name) { "requests_table_name" } else { "cache_table_name" };
            ConfigError::Invalid { field: field.into(), reason: e.to_string() }
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MARQUEE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(Env::raw().only(PLAIN_ENV_KEYS))
            .merge(
                Env::prefixed("MARQUEE_")
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
    }

    /// Check if the TMDB token is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_tmdb_api_token(&self) -> Result<&str, ConfigError> {
        self.tmdb_api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "tmdb_api_token".into(),
                hint: "Set MARQUEE_TMDB_API_TOKEN or TMDB_API_TOKEN environment variable".into(),
            })
    }
}
