//! Cached catalog payloads.
//!
//! Entries are append-only: every successful fetch adds a row stamped with the
//! current time, and reads only look at rows inside the freshness window.
//! Stale rows are ignored rather than deleted.

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use tokio_rusqlite::params;

use super::connection::CacheDb;
use crate::Error;
use crate::clock::Clock;

/// Reads and writes cached payloads for `(search_term, page)` pairs.
#[derive(Debug, Clone)]
pub struct ResultStore {
    db: CacheDb,
    clock: Arc<dyn Clock>,
}

impl ResultStore {
    pub fn new(db: CacheDb, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Get the freshest payload for `search_term` and `page`.
    ///
    /// Only rows created strictly after `now - window` are considered. When
    /// several rows qualify the most recent one wins.
    pub async fn query(&self, search_term: &str, page: u32, window: Duration) -> Result<Option<Value>, Error> {
        let sql = format!(
            "SELECT data FROM {} WHERE search_term = ?1 AND created_at > ?2 AND page = ?3
             ORDER BY created_at DESC, id DESC LIMIT 1",
            self.db.tables().results
        );
        let search_term = search_term.to_string();
        let cutoff = (self.clock.now() - window).timestamp_millis();

        let data = self
            .db
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare(&sql)?;

                let result = stmt.query_row(params![search_term, cutoff, page], |row| row.get(0));

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        data.map(|json| serde_json::from_str(&json).map_err(Error::from))
            .transpose()
    }

    /// Append a payload stamped with the current time.
    pub async fn put(&self, search_term: &str, page: u32, payload: &Value) -> Result<(), Error> {
        let sql = format!(
            "INSERT INTO {} (search_term, created_at, page, data) VALUES (?1, ?2, ?3, ?4)",
            self.db.tables().results
        );
        let search_term = search_term.to_string();
        let data = serde_json::to_string(payload)?;
        let created_at = self.clock.now().timestamp_millis();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(&sql, params![search_term, created_at, page, data])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete rows older than `age`.
    ///
    /// Lookups never need this; it exists for operators who want to bound
    /// the table size. Returns the number of deleted rows.
    pub async fn purge_older_than(&self, age: Duration) -> Result<u64, Error> {
        let sql = format!("DELETE FROM {} WHERE created_at <= ?1", self.db.tables().results);
        let cutoff = (self.clock.now() - age).timestamp_millis();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(&sql, params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    #[cfg(test)]
    async fn row_count(&self) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {}", self.db.tables().results);
        self.db
            .conn
            .call(move |conn| conn.query_row(&sql, [], |row| row.get(0)))
            .await
            .unwrap()
    }
}
