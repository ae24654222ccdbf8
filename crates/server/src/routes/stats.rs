//! `GET /stats` implementation.
//!
//! Reports the hit ledger for one day, defaulting to today in server-local
//! time. Unlike search, this route has no fallback when the store is down.

use axum::{
    Json,
    extract::{Query, State},
};
use marquee_core::DailyStats;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handler::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    /// Day to report as `YYYYMMDD`.
    pub date: Option<String>,
}

/// Handler for GET /stats
pub async fn stats_handler(
    State(state): State<AppState>, Query(params): Query<StatsParams>,
) -> Result<Json<DailyStats>, ApiError> {
    stats_impl(&state, params).await.map(Json)
}

pub async fn stats_impl(state: &AppState, params: StatsParams) -> Result<DailyStats, ApiError> {
    let date = params.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
    Ok(state.cache.daily_stats(date).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, test_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_stats_empty_day() {
        let state = test_state(FakeCatalog::ok(json!({}))).await;
        let stats = stats_impl(&state, StatsParams { date: Some("20240101".into()) }).await.unwrap();

        assert_eq!(stats.date, "20240101");
        assert_eq!(stats.total_hits, 0);
        assert!(stats.records.is_empty());
    }

    #[tokio::test]
    async fn test_stats_rejects_bad_date() {
        let state = test_state(FakeCatalog::ok(json!({}))).await;
        let result = stats_impl(&state, StatsParams { date: Some("2024-01-01".into()) }).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_stats_blank_date_means_today() {
        let state = test_state(FakeCatalog::ok(json!({}))).await;
        let stats = stats_impl(&state, StatsParams { date: Some(" ".into()) }).await.unwrap();
        assert_eq!(stats.date, state.cache.ledger().today());
    }
}
