//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use std::sync::Arc;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA temp_store=MEMORY;
                       PRAGMA busy_timeout=5000;";

/// Names of the two backing tables.
///
/// Both are interpolated into SQL, so they are restricted to plain identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Cached catalog payloads.
    pub results: String,
    /// Daily hit counters.
    pub ledger: String,
}

impl Tables {
    pub fn new(results: impl Into<String>, ledger: impl Into<String>) -> Result<Self, Error> {
        let tables = Self { results: results.into(), ledger: ledger.into() };
        for name in [&tables.results, &tables.ledger] {
            if !is_valid_table_name(name) {
                return Err(Error::InvalidInput(format!("invalid table name: {name:?}")));
            }
        }
        if tables.results.eq_ignore_ascii_case(&tables.ledger) {
            return Err(Error::InvalidInput("results and ledger tables must differ".into()));
        }
        Ok(tables)
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self { results: "search_cache".into(), ledger: "api_requests".into() }
    }
}

/// ASCII letters, digits and underscores, not starting with a digit or `sqlite_`.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.to_ascii_lowercase().starts_with("sqlite_")
}

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning is cheap and every clone talks to the
/// same connection.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
    tables: Arc<Tables>,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and creates the configured tables if they are missing.
    pub async fn open(path: impl AsRef<Path>, tables: Tables) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, tables).await
    }

    /// Open an in-memory database with the default table names.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Self::open_in_memory_with(Tables::default()).await
    }

    /// Open an in-memory database with custom table names.
    pub async fn open_in_memory_with(tables: Tables) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, tables).await
    }

    async fn init(conn: Connection, tables: Tables) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn, &tables).await?;

        Ok(Self { conn, tables: Arc::new(tables) })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Close the underlying connection.
    ///
    /// Any clone still held elsewhere will get `STORE_UNAVAILABLE` on its next call.
    pub async fn close(self) -> Result<(), Error> {
        self.conn.close().await.map_err(|e| Error::Database(e.into()))
    }
}
