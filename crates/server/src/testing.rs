//! Test doubles shared by the route and router tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use chrono::{TimeZone, Utc};
use marquee_client::{MovieCatalog, TmdbError};
use marquee_core::{CacheDb, CacheService, ManualClock};
use serde_json::Value;

use crate::handler::AppState;

/// A catalog that answers every search with the same canned result.
#[derive(Clone)]
pub struct FakeCatalog {
    response: Option<Value>,
    calls: Arc<AtomicUsize>,
}

impl FakeCatalog {
    pub fn ok(response: Value) -> Self {
        Self { response: Some(response), calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn failing() -> Self {
        Self { response: None, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn search_movies(&self, _search_term: &str, _page: u32) -> Result<Value, TmdbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or(TmdbError::HttpError { status: 503 })
    }
}

/// Everything a test might want to poke at behind an [`AppState`].
pub struct Harness {
    pub state: AppState,
    pub db: CacheDb,
    pub clock: ManualClock,
}

/// In-memory state with a manual clock and a two-minute freshness window.
pub async fn harness(catalog: FakeCatalog) -> Harness {
    let db = CacheDb::open_in_memory().await.unwrap();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
    let cache = CacheService::new(db.clone(), Arc::new(clock.clone()), chrono::Duration::minutes(2));
    Harness { state: AppState::new(cache, Arc::new(catalog)), db, clock }
}

pub async fn test_state(catalog: FakeCatalog) -> AppState {
    harness(catalog).await.state
}

pub async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
