//! Webhook handler for GitHub push and pull request events

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;

use crate::SharedState;
use crate::error::MonitorError;
use crate::event::EventView;
use crate::ingest::IngestOutcome;
use crate::webhook::EVENT_HEADER;

/// POST /webhook - Classify, normalize and store a GitHub notification
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let event_type = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());
    debug!("Received {:?} webhook ({} bytes)", event_type, body.len());

    match state.service.ingest_body(event_type, &body).await {
        Ok(IngestOutcome::Stored { id, event }) => {
            // No subscribers is fine
            let _ = state.event_feed.send(EventView::from(&event));
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": "Event stored successfully",
                    "id": id
                })),
            )
        }
        Ok(IngestOutcome::Ignored) => (
            StatusCode::OK,
            Json(json!({
                "status": "ignored",
                "message": "Event type not tracked"
            })),
        ),
        Err(e) => {
            let status = match &e {
                MonitorError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({
                    "status": "error",
                    "message": e.to_string()
                })),
            )
        }
    }
}
