//! Liveness endpoint

use axum::Json;
use chrono::Utc;

use crate::api::dto::response::HealthResponse;

/// `GET /api/health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
