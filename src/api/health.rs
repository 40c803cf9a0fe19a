use axum::{
    Json,
    extract::State as AxumState,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::warn;

use crate::SharedState;
use crate::ingest::HealthReport;

/// GET /health - Liveness probe against the event store
pub async fn health(AxumState(state): AxumState<SharedState>) -> impl IntoResponse {
    match state.service.health().await {
        HealthReport::Healthy => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected"
            })),
        ),
        HealthReport::Unhealthy { error } => {
            warn!("Health check failed: {}", error);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "store": "disconnected",
                    "error": error
                })),
            )
        }
    }
}
