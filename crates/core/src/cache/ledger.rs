//! Daily request counters.
//!
//! One row per `(date, request key)`. `total_hits` counts every request for
//! the key that day; `cache_hits` counts the ones served from cache.
//!
//! Increments are a single UPSERT, so concurrent requests for the same key
//! never overwrite each other's counts. Processes sharing one database file
//! are serialized by SQLite's write lock.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

use super::connection::CacheDb;
use super::key::{date_key, is_date_key, request_key};
use crate::Error;
use crate::clock::Clock;

/// Counters for one request key on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    pub date: String,
    pub key: String,
    pub total_hits: i64,
    pub cache_hits: i64,
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Served from cache.
    Hit,
    /// Not in cache; the caller goes to the catalog.
    Miss,
}

impl Outcome {
    fn cache_increment(self) -> i64 {
        match self {
            Outcome::Hit => 1,
            Outcome::Miss => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HitLedger {
    db: CacheDb,
    clock: Arc<dyn Clock>,
}

impl HitLedger {
    pub fn new(db: CacheDb, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Count a request that was served from cache.
    pub async fn record_hit(&self, search_term: &str, page: u32) -> Result<HitRecord, Error> {
        self.record(search_term, page, Outcome::Hit).await
    }

    /// Count a request that missed the cache.
    pub async fn record_miss(&self, search_term: &str, page: u32) -> Result<HitRecord, Error> {
        self.record(search_term, page, Outcome::Miss).await
    }

    /// Bump today's counters for the pair and return the updated record.
    ///
    /// The date is read once per call; a request landing on local midnight
    /// counts under whichever day the clock reports at that moment.
    pub async fn record(&self, search_term: &str, page: u32, outcome: Outcome) -> Result<HitRecord, Error> {
        let table = self.db.tables().ledger.clone();
        let date = date_key(self.clock.as_ref());
        let key = request_key(search_term, page)?;
        let cache_inc = outcome.cache_increment();

        self.db
            .conn
            .call(move |conn| -> Result<HitRecord, Error> {
                conn.execute(
                    &format!(
                        "INSERT INTO {table} (date, key, total_hits, cache_hits) VALUES (?1, ?2, 1, ?3)
                        ON CONFLICT(date, key) DO UPDATE SET
                            total_hits = total_hits + 1,
                            cache_hits = cache_hits + excluded.cache_hits"
                    ),
                    params![date, key, cache_inc],
                )?;

                let record = conn.query_row(
                    &format!("SELECT date, key, total_hits, cache_hits FROM {table} WHERE date = ?1 AND key = ?2"),
                    params![date, key],
                    row_to_record,
                )?;
                Ok(record)
            })
            .await
            .map_err(Error::from)
    }

    /// Today's record for the pair.
    ///
    /// `Ok(None)` means no request for the pair has been counted today.
    pub async fn get(&self, search_term: &str, page: u32) -> Result<Option<HitRecord>, Error> {
        let date = date_key(self.clock.as_ref());
        self.get_on(&date, search_term, page).await
    }

    /// The record for the pair on a specific day.
    pub async fn get_on(&self, date: &str, search_term: &str, page: u32) -> Result<Option<HitRecord>, Error> {
        let sql = format!(
            "SELECT date, key, total_hits, cache_hits FROM {} WHERE date = ?1 AND key = ?2",
            self.db.tables().ledger
        );
        let date = date.to_string();
        let key = request_key(search_term, page)?;

        self.db
            .conn
            .call(move |conn| -> Result<Option<HitRecord>, Error> {
                let mut stmt = conn.prepare(&sql)?;

                let result = stmt.query_row(params![date, key], row_to_record);

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Every record for a day, busiest keys first.
    pub async fn day(&self, date: &str) -> Result<Vec<HitRecord>, Error> {
        if !is_date_key(date) {
            return Err(Error::InvalidInput(format!("date must be YYYYMMDD, got {date:?}")));
        }

        let sql = format!(
            "SELECT date, key, total_hits, cache_hits FROM {} WHERE date = ?1
             ORDER BY total_hits DESC, key ASC",
            self.db.tables().ledger
        );
        let date = date.to_string();

        self.db
            .conn
            .call(move |conn| -> Result<Vec<HitRecord>, Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![date], row_to_record)?;
                let records = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }

    /// Today's partition key, as seen by this ledger's clock.
    pub fn today(&self) -> String {
        date_key(self.clock.as_ref())
    }
}

fn row_to_record(row: &tokio_rusqlite::rusqlite::Row<'_>) -> tokio_rusqlite::rusqlite::Result<HitRecord> {
    Ok(HitRecord { date: row.get(0)?, key: row.get(1)?, total_hits: row.get(2)?, cache_hits: row.get(3)? })
}
