//! HTTP server state and router.
//!
//! This module defines the shared application state and wires each route to
//! its implementation in [`crate::routes`].

use std::sync::Arc;

use axum::{Router, routing::get};
use marquee_client::MovieCatalog;
use marquee_core::CacheService;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::{health::health_handler, search::search_handler, stats::stats_handler};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheService,
    pub catalog: Arc<dyn MovieCatalog>,
}

impl AppState {
    pub fn new(cache: CacheService, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { cache, catalog }
    }
}

/// Build the router with every endpoint.
///
/// - `GET /movies/search?input=&page=`
/// - `GET /health-check`
/// - `GET /stats?date=`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/movies/search", get(search_handler))
        .route("/health-check", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
