//! Cache orchestration for search requests.
//!
//! The search handler talks only to [`CacheService`]. It never sees a store
//! error: failed reads become misses and failed writes become `false`, each
//! logged as a structured `warn` event.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use serde_json::Value;

use super::connection::CacheDb;
use super::ledger::{HitLedger, HitRecord};
use super::results::ResultStore;
use crate::Error;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;

/// Outcome of a cache lookup.
///
/// `error` is only for logging; a lookup with an error is still a plain miss
/// to the caller.
#[derive(Debug)]
pub struct CacheLookup {
    pub in_cache: bool,
    pub data: Option<Value>,
    pub error: Option<Error>,
}

impl CacheLookup {
    fn hit(data: Value) -> Self {
        Self { in_cache: true, data: Some(data), error: None }
    }

    fn miss() -> Self {
        Self { in_cache: false, data: None, error: None }
    }

    fn degraded(error: Error) -> Self {
        Self { in_cache: false, data: None, error: Some(error) }
    }

    /// The cached payload, if this was a hit.
    pub fn into_hit(self) -> Option<Value> {
        if self.in_cache { self.data } else { None }
    }
}

/// Ledger totals for one day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub date: String,
    pub total_hits: i64,
    pub cache_hits: i64,
    pub hit_rate: f64,
    pub records: Vec<HitRecord>,
}

impl DailyStats {
    fn from_records(date: String, records: Vec<HitRecord>) -> Self {
        let total_hits: i64 = records.iter().map(|r| r.total_hits).sum();
        let cache_hits: i64 = records.iter().map(|r| r.cache_hits).sum();
        let hit_rate = if total_hits == 0 { 0.0 } else { cache_hits as f64 / total_hits as f64 };
        Self { date, total_hits, cache_hits, hit_rate, records }
    }
}

#[derive(Debug, Clone)]
pub struct CacheService {
    results: ResultStore,
    ledger: HitLedger,
    window: Duration,
}

impl CacheService {
    pub fn new(db: CacheDb, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self { results: ResultStore::new(db.clone(), clock.clone()), ledger: HitLedger::new(db, clock), window }
    }

    /// Build a service on the wall clock with the configured freshness window.
    pub fn from_config(db: CacheDb, config: &AppConfig) -> Self {
        Self::new(db, Arc::new(SystemClock), config.freshness_window())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Look for a fresh cached payload.
    ///
    /// The request is counted in the hit ledger before this returns: as a
    /// cache hit when a fresh entry exists, otherwise as a miss.
    pub async fn lookup(&self, search_term: &str, page: u32) -> CacheLookup {
        match self.results.query(search_term, page, self.window).await {
            Ok(Some(data)) => {
                if let Err(e) = self.ledger.record_hit(search_term, page).await {
                    tracing::warn!(op = "record_hit", search_term, page, error = %e, "hit ledger update failed");
                }
                tracing::debug!(search_term, page, "cache hit");
                CacheLookup::hit(data)
            }
            Ok(None) => {
                self.count_miss(search_term, page).await;
                tracing::debug!(search_term, page, "cache miss");
                CacheLookup::miss()
            }
            Err(e) => {
                tracing::warn!(op = "query", search_term, page, error = %e, "cache lookup failed, treating as miss");
                self.count_miss(search_term, page).await;
                CacheLookup::degraded(e)
            }
        }
    }

    /// Save a freshly fetched payload.
    ///
    /// Returns whether the write succeeded. A failed write never affects the
    /// payload the caller already holds.
    pub async fn store(&self, search_term: &str, page: u32, payload: &Value) -> bool {
        match self.results.put(search_term, page, payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(op = "put", search_term, page, error = %e, "failed to cache search result");
                false
            }
        }
    }

    /// Ledger totals for `date`, or for today when `date` is `None`.
    pub async fn daily_stats(&self, date: Option<&str>) -> Result<DailyStats, Error> {
        let date = date.map_or_else(|| self.ledger.today(), str::to_string);
        let records = self.ledger.day(&date).await?;
        Ok(DailyStats::from_records(date, records))
    }

    /// The hit ledger behind this service.
    pub fn ledger(&self) -> &HitLedger {
        &self.ledger
    }

    /// The result store behind this service.
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    async fn count_miss(&self, search_term: &str, page: u32) {
        if let Err(e) = self.ledger.record_miss(search_term, page).await {
            tracing::warn!(op = "record_miss", search_term, page, error = %e, "hit ledger update failed");
        }
    }
}
