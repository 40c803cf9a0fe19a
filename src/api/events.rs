//! Event listing endpoint

use axum::{
    Json,
    extract::State as AxumState,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use crate::SharedState;
use crate::event::EventView;

/// Response for the event listing
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub status: &'static str,
    pub count: usize,
    pub events: Vec<EventView>,
}

/// GET /events - All stored events, newest first
pub async fn get_events(AxumState(state): AxumState<SharedState>) -> impl IntoResponse {
    match state.service.list_events().await {
        Ok(events) => Json(EventsResponse {
            status: "success",
            count: events.len(),
            events,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": e.to_string()
            })),
        )
            .into_response(),
    }
}
