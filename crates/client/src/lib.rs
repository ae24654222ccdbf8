//! Client code for marquee.
//!
//! This crate provides the movie catalog client the search proxy falls back
//! to on a cache miss.

pub mod tmdb;

pub use tmdb::{MovieCatalog, SearchRequest, TmdbClient, TmdbConfig, TmdbError};
