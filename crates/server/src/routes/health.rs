//! `GET /health-check` implementation.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
}

/// Handler for GET /health-check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { success: true })
}
