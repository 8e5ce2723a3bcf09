//! Liveness probe.

use axum::Json;

use crate::schema::health::HealthResponse;

/// `GET /api/health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "trace replay server is running".to_string(),
    })
}
