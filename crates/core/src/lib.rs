//! Core types and shared functionality for marquee.
//!
//! This crate provides:
//! - Cache implementation with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - An injectable clock

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheLookup, CacheService, DailyStats, HitRecord};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
