//! `GET /movies/search` implementation.
//!
//! Validates `input` and `page`, serves from cache when a fresh entry exists,
//! and otherwise fetches from the catalog and caches the result.

use axum::{
    Json,
    extract::{Query, State},
};
use marquee_client::tmdb::MAX_PAGE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, FieldError};
use crate::handler::AppState;

const MIN_TERM_CHARS: usize = 3;

/// Raw query parameters, validated by hand so every problem is reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub input: Option<String>,
    pub page: Option<String>,
}

/// A search that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSearch {
    pub term: String,
    pub page: u32,
}

impl SearchParams {
    /// Check both parameters, collecting one error per bad parameter.
    ///
    /// The search term is trimmed before use.
    pub fn validate(&self) -> Result<MovieSearch, Vec<FieldError>> {
        let mut errors = Vec::new();

        let term = self.input.as_deref().map(str::trim);
        match term {
            None | Some("") => errors.push(FieldError::new("input", "search term is missing")),
            Some(t) if t.chars().count() < MIN_TERM_CHARS => {
                errors.push(FieldError::new("input", "Search term must be at least 3 characters"))
            }
            Some(_) => {}
        }

        let page = match self.page.as_deref().map(str::trim).map(parse_page) {
            Some(Ok(p)) if p < 1 => {
                errors.push(FieldError::new("page", "Page must be greater than 0"));
                None
            }
            Some(Ok(p)) if p > i64::from(MAX_PAGE) => {
                errors.push(FieldError::new("page", "Page must not exceed 500"));
                None
            }
            Some(Ok(p)) => u32::try_from(p).ok(),
            Some(Err(PageError::TooLarge)) => {
                errors.push(FieldError::new("page", "Page must not exceed 500"));
                None
            }
            _ => {
                errors.push(FieldError::new("page", "Page must be greater than 0"));
                None
            }
        };

        match (term, page) {
            (Some(term), Some(page)) if errors.is_empty() => Ok(MovieSearch { term: term.to_string(), page }),
            _ => Err(errors),
        }
    }
}

enum PageError {
    NotAnInteger,
    TooLarge,
}

/// Parse an optionally signed decimal integer. Digits that overflow `i64`
/// count as too large rather than malformed.
fn parse_page(raw: &str) -> Result<i64, PageError> {
    raw.parse::<i64>().map_err(|_| {
        let digits = raw.strip_prefix('+').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            PageError::TooLarge
        } else {
            PageError::NotAnInteger
        }
    })
}

/// Where a search response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Cache,
    TmdbApi,
}

/// Response body for a successful search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    pub source: Source,
    pub data: Value,
}

/// Handler for GET /movies/search
pub async fn search_handler(
    State(state): State<AppState>, Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutput>, ApiError> {
    let search = params.validate().map_err(ApiError::Validation)?;
    search_impl(&state, &search).await.map(Json)
}

/// Serve a validated search from cache or the catalog.
pub async fn search_impl(state: &AppState, search: &MovieSearch) -> Result<SearchOutput, ApiError> {
    let lookup = state.cache.lookup(&search.term, search.page).await;
    if let Some(data) = lookup.into_hit() {
        return Ok(SearchOutput { source: Source::Cache, data });
    }

    let data = state.catalog.search_movies(&search.term, search.page).await?;

    if !state.cache.store(&search.term, search.page, &data).await {
        tracing::info!(search_term = %search.term, page = search.page, "serving uncached catalog result");
    }

    Ok(SearchOutput { source: Source::TmdbApi, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, test_state};
    use serde_json::json;

    fn params(input: Option<&str>, page: Option<&str>) -> SearchParams {
        SearchParams { input: input.map(String::from), page: page.map(String::from) }
    }

    #[test]
    fn test_validate_ok_and_trims() {
        let search = params(Some("  batman "), Some("2")).validate().unwrap();
        assert_eq!(search, MovieSearch { term: "batman".into(), page: 2 });
    }

    #[test]
    fn test_validate_missing_input() {
        let errors = params(None, Some("1")).validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("input", "search term is missing")]);

        let errors = params(Some("   "), Some("1")).validate().unwrap_err();
        assert_eq!(errors[0].error, "search term is missing");
    }

    #[test]
    fn test_validate_short_input() {
        let errors = params(Some("up"), Some("1")).validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("input", "Search term must be at least 3 characters")]);
    }

    #[test]
    fn test_validate_bad_pages() {
        for page in [None, Some("0"), Some("-3"), Some("abc"), Some("1.5"), Some("")] {
            let errors = params(Some("batman"), page).validate().unwrap_err();
            assert_eq!(errors, vec![FieldError::new("page", "Page must be greater than 0")], "page {page:?}");
        }

        let errors = params(Some("batman"), Some("501")).validate().unwrap_err();
        assert_eq!(errors[0].error, "Page must not exceed 500");
    }

    #[test]
    fn test_validate_huge_page_is_too_large() {
        for page in ["99999999999999999999", "+99999999999999999999"] {
            let errors = params(Some("batman"), Some(page)).validate().unwrap_err();
            assert_eq!(errors, vec![FieldError::new("page", "Page must not exceed 500")], "page {page}");
        }

        let errors = params(Some("batman"), Some("-99999999999999999999")).validate().unwrap_err();
        assert_eq!(errors[0].error, "Page must be greater than 0");

        let search = params(Some("batman"), Some("+7")).validate().unwrap();
        assert_eq!(search.page, 7);
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let errors = params(Some("x"), Some("0")).validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].param, "input");
        assert_eq!(errors[1].param, "page");
    }

    #[tokio::test]
    async fn test_search_impl_miss_then_hit() {
        let catalog = FakeCatalog::ok(json!({"results": [{"id": 1, "title": "Batman"}]}));
        let state = test_state(catalog.clone()).await;
        let search = MovieSearch { term: "batman".into(), page: 1 };

        let first = search_impl(&state, &search).await.unwrap();
        assert_eq!(first.source, Source::TmdbApi);

        let second = search_impl(&state, &search).await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.data, first.data);
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_impl_catalog_failure_not_cached() {
        let catalog = FakeCatalog::failing();
        let state = test_state(catalog.clone()).await;
        let search = MovieSearch { term: "batman".into(), page: 1 };

        assert!(matches!(search_impl(&state, &search).await, Err(ApiError::Upstream(_))));
        assert!(search_impl(&state, &search).await.is_err());
        assert_eq!(catalog.calls(), 2);
    }
}
