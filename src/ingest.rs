//! Ingestion and query orchestration
//!
//! Write path: classify -> extract -> store. Read path: store -> format.
//! The stored record always keeps the raw instant; formatting happens on read.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info};

use crate::db::SqlEventStore;
use crate::error::{MonitorError, Result};
use crate::event::{CanonicalEvent, EventView};
use crate::webhook::WebhookEvent;

/// Result of ingesting one notification
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored { id: String, event: CanonicalEvent },
    Ignored,
}

/// Result of a store liveness probe
#[derive(Debug, Clone, PartialEq)]
pub enum HealthReport {
    Healthy,
    Unhealthy { error: String },
}

#[derive(Clone)]
pub struct IngestService {
    store: SqlEventStore,
}

impl IngestService {
    pub fn new(store: SqlEventStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqlEventStore {
        &self.store
    }

    /// Ingest a raw request body. A body that is not JSON is an `InvalidPayload` error.
    pub async fn ingest_body(&self, tag: Option<&str>, body: &[u8]) -> Result<IngestOutcome> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| MonitorError::InvalidPayload(format!("Could not parse JSON body: {}", e)))?;
        self.ingest(tag, &payload).await
    }

    /// Ingest a decoded payload, stamped with the current time
    pub async fn ingest(&self, tag: Option<&str>, payload: &Value) -> Result<IngestOutcome> {
        self.ingest_at(tag, payload, Utc::now()).await
    }

    /// Ingest a decoded payload with an explicit ingestion instant
    pub async fn ingest_at(
        &self,
        tag: Option<&str>,
        payload: &Value,
        received_at: DateTime<Utc>,
    ) -> Result<IngestOutcome> {
        let kind = WebhookEvent::decode(tag, payload);
        let Some(event) = kind.extract(payload, received_at) else {
            info!("Event not tracked: {:?}", kind);
            return Ok(IngestOutcome::Ignored);
        };

        let id = self.store.insert(&event).await.inspect_err(|e| {
            error!("Error processing webhook: {}", e);
        })?;
        info!("Stored event {}: {} by {}", id, event.action, event.author);

        Ok(IngestOutcome::Stored { id, event })
    }

    /// Every stored event newest first, with human-readable timestamps
    pub async fn list_events(&self) -> Result<Vec<EventView>> {
        let events = self.store.list_all().await.inspect_err(|e| {
            error!("Error retrieving events: {}", e);
        })?;

        Ok(events.into_iter().map(EventView::from).collect())
    }

    pub async fn health(&self) -> HealthReport {
        match self.store.ping().await {
            Ok(()) => HealthReport::Healthy,
            Err(e) => HealthReport::Unhealthy {
                error: e.to_string(),
            },
        }
    }
}
