//! TMDB movie search request types and validation.

use serde::Serialize;

use super::TmdbError;

/// Highest page TMDB will serve for a search.
pub const MAX_PAGE: u32 = 500;

/// Query parameters for `GET /search/movie`.
///
/// Adult titles are always excluded and results are requested in `en-US`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub include_adult: bool,
    pub language: String,
    pub query: String,
    pub page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self { include_adult: false, language: "en-US".to_string(), query: query.into(), page }
    }

    /// Validate the search request parameters.
    ///
    /// Returns an error if the query is shorter than three characters after
    /// trimming, or the page is out of TMDB's range.
    pub fn validate(&self) -> Result<(), TmdbError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(TmdbError::InvalidQuery("query cannot be empty".to_string()));
        }

        if query.chars().count() < 3 {
            return Err(TmdbError::InvalidQuery("query must be at least 3 characters".to_string()));
        }

        if !(1..=MAX_PAGE).contains(&self.page) {
            return Err(TmdbError::InvalidPage);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = SearchRequest::new("batman", 1);
        assert!(req.validate().is_ok());
        assert!(!req.include_adult);
        assert_eq!(req.language, "en-US");
    }

    #[test]
    fn test_empty_query() {
        assert!(matches!(SearchRequest::new("   ", 1).validate(), Err(TmdbError::InvalidQuery(_))));
    }

    #[test]
    fn test_short_query() {
        assert!(SearchRequest::new("up", 1).validate().is_err());
        assert!(SearchRequest::new(" up ", 1).validate().is_err());
        assert!(SearchRequest::new("ran", 1).validate().is_ok());
    }

    #[test]
    fn test_page_range() {
        assert!(matches!(SearchRequest::new("batman", 0).validate(), Err(TmdbError::InvalidPage)));
        assert!(matches!(SearchRequest::new("batman", 501).validate(), Err(TmdbError::InvalidPage)));
        assert!(SearchRequest::new("batman", 500).validate().is_ok());
    }
}
