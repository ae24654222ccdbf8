//! HTTP route implementations.
//!
//! Each route lives in its own module with its params/output types and an
//! `_impl` function the router handler delegates to.

pub mod health;
pub mod search;
pub mod stats;
