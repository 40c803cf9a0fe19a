use crate::error::MonitorError;
use crate::event::{CanonicalEvent, EventAction};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Append-only persistent storage for canonical events using SQLite
#[derive(Clone)]
pub struct SqlEventStore {
    pool: SqlitePool,
}

impl SqlEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new event record, returns its generated ID
    pub async fn insert(&self, event: &CanonicalEvent) -> Result<String, MonitorError> {
        let id = Uuid::now_v7().to_string();

        sqlx::query(
            r#"
            INSERT INTO events (
                id, request_id, author, action,
                from_branch, to_branch, timestamp
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&event.request_id)
        .bind(&event.author)
        .bind(event.action.as_str())
        .bind(&event.from_branch)
        .bind(&event.to_branch)
        .bind(encode_timestamp(event.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| MonitorError::DatabaseError(format!("Failed to insert event: {}", e)))?;

        Ok(id)
    }

    /// All events, newest first. Equal timestamps list the later insert first.
    pub async fn list_all(&self) -> Result<Vec<CanonicalEvent>, MonitorError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                request_id, author, action,
                from_branch, to_branch, timestamp
            FROM events
            ORDER BY timestamp DESC, seq DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MonitorError::DatabaseError(format!("Failed to fetch events: {}", e)))?;

        rows.into_iter().map(CanonicalEvent::try_from).collect()
    }

    /// Count stored events
    pub async fn count(&self) -> Result<i64, MonitorError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MonitorError::DatabaseError(format!("Failed to count events: {}", e)))?;

        Ok(count.0)
    }

    /// Liveness probe against the database
    pub async fn ping(&self) -> Result<(), MonitorError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| MonitorError::DatabaseError(format!("Database unreachable: {}", e)))?;

        Ok(())
    }

    /// Close every pooled connection. Later calls fail with a database error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Fixed-width RFC 3339 so that text order matches time order
fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

// Helper struct to map DB row to CanonicalEvent
#[derive(FromRow)]
struct EventRow {
    request_id: String,
    author: String,
    action: String,
    from_branch: Option<String>,
    to_branch: String,
    timestamp: String,
}

impl TryFrom<EventRow> for CanonicalEvent {
    type Error = MonitorError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let action: EventAction = row.action.parse()?;
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                MonitorError::DatabaseError(format!(
                    "Invalid stored timestamp '{}': {}",
                    row.timestamp, e
                ))
            })?;

        Ok(CanonicalEvent {
            request_id: row.request_id,
            author: row.author,
            action,
            from_branch: row.from_branch,
            to_branch: row.to_branch,
            timestamp,
        })
    }
}
