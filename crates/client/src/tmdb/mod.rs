//! TMDB movie search client.
//!
//! Fetches one page of `GET /search/movie` results and hands back the response
//! body untouched, as an opaque JSON payload the cache can store verbatim.
//!
//! ### Request shape
//!
//! - **Endpoint**: `{base_url}/search/movie`
//! - **Authentication**: API read access token as a `Bearer` header.
//! - **Fixed parameters**: `include_adult=false`, `language=en-US`.
//! - **Errors**: 401/403 map to `AuthError`, 429 to `RateLimited`, other
//!   4xx/5xx to `HttpError`.

pub mod error;
pub mod request;

pub use error::TmdbError;
pub use request::{MAX_PAGE, SearchRequest};

use async_trait::async_trait;
use marquee_core::AppConfig;
use reqwest::header;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Default base URL for the TMDB v3 API.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "marquee/0.1";

/// Anything that can answer a movie title search.
///
/// The search handler depends on this rather than on [`TmdbClient`] so tests
/// can swap in a canned catalog.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search_movies(&self, search_term: &str, page: u32) -> Result<Value, TmdbError>;
}

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API read access token.
    pub api_token: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: marquee/0.x).
    pub user_agent: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TmdbConfig {
    /// Build client settings from the application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, TmdbError> {
        let api_token = config
            .require_tmdb_api_token()
            .map_err(|_| TmdbError::MissingApiToken)?
            .to_string();

        Ok(Self {
            api_token,
            base_url: config.tmdb_api_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// TMDB API client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    config: Arc<TmdbConfig>,
    search_url: Url,
}

impl TmdbClient {
    /// Create a new TMDB client with the given configuration.
    pub fn new(config: TmdbConfig) -> Result<Self, TmdbError> {
        if config.api_token.trim().is_empty() {
            return Err(TmdbError::MissingApiToken);
        }

        let search_url = format!("{}/search/movie", config.base_url.trim_end_matches('/'));
        let search_url = Url::parse(&search_url).map_err(|e| TmdbError::InvalidBaseUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| TmdbError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config), search_url })
    }

    /// Create a client from the application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, TmdbError> {
        Self::new(TmdbConfig::from_app_config(config)?)
    }

    /// Build the HTTP request for a search without sending it.
    pub fn build_request(&self, req: &SearchRequest) -> Result<reqwest::Request, TmdbError> {
        self.http
            .get(self.search_url.clone())
            .bearer_auth(&self.config.api_token)
            .header(header::ACCEPT, "application/json")
            .query(req)
            .build()
            .map_err(TmdbError::from)
    }

    /// Execute a movie search.
    ///
    /// Validates the request, sends it, and returns the raw JSON body.
    pub async fn search(&self, req: SearchRequest) -> Result<Value, TmdbError> {
        req.validate()?;

        let start = Instant::now();
        let http_request = self.build_request(&req)?;

        tracing::debug!(query = %req.query, page = req.page, "searching TMDB");

        let http_response = self.http.execute(http_request).await?;

        let status = http_response.status();
        tracing::debug!(%status, "TMDB response status");

        if let Some(err) = TmdbError::from_status(status) {
            return Err(err);
        }

        let bytes = http_response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| TmdbError::Parse(e.to_string()))?;

        let results = payload.get("results").and_then(Value::as_array).map_or(0, Vec::len);
        tracing::debug!(elapsed = ?start.elapsed(), results, "TMDB search completed");

        Ok(payload)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movies(&self, search_term: &str, page: u32) -> Result<Value, TmdbError> {
        self.search(SearchRequest::new(search_term, page)).await
    }
}
