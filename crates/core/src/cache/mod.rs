//! SQLite-backed cache for movie search results.
//!
//! This module provides the cache subsystem of the search proxy using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Append-only result storage with a time-window freshness check
//! - A per-day, per-request hit ledger with atomic counter updates
//! - Configurable table names and automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod key;
pub mod ledger;
pub mod migrations;
pub mod results;
pub mod service;

pub use crate::Error;

pub use connection::{CacheDb, Tables};
pub use ledger::{HitLedger, HitRecord, Outcome};
pub use results::ResultStore;
pub use service::{CacheLookup, CacheService, DailyStats};
