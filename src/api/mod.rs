//! API module for all HTTP handlers
//!
//! Webhook ingestion, event listing, health probe and the live event stream

pub mod events;
pub mod health;
pub mod stream;
pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;
use crate::ui::serve_ui;

// Re-export handlers
pub use events::get_events;
pub use health::health;
pub use stream::stream_events;
pub use webhook::handle_webhook;

/// Build the application router. Unmatched GET routes fall through to the dashboard.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/webhook", routing::post(handle_webhook))
        .route("/events", routing::get(get_events))
        .route("/events/stream", routing::get(stream_events))
        .route("/health", routing::get(health))
        .fallback(routing::get(serve_ui))
        .with_state(state)
}
