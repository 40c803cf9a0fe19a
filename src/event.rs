use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;
use crate::utils::format_timestamp;

/// Normalized action of a stored event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    Push,
    PullRequest,
    Merge,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Push => "PUSH",
            EventAction::PullRequest => "PULL_REQUEST",
            EventAction::Merge => "MERGE",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventAction {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUSH" => Ok(EventAction::Push),
            "PULL_REQUEST" => Ok(EventAction::PullRequest),
            "MERGE" => Ok(EventAction::Merge),
            other => Err(MonitorError::DatabaseError(format!(
                "Unknown event action '{}'",
                other
            ))),
        }
    }
}

/// A push or pull request notification mapped into the single stored shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalEvent {
    pub request_id: String,
    pub author: String,
    pub action: EventAction,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: DateTime<Utc>,
}

/// Read-side view of a stored event, timestamp rendered for humans
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventView {
    pub request_id: String,
    pub author: String,
    pub action: EventAction,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: String,
}

impl From<&CanonicalEvent> for EventView {
    fn from(event: &CanonicalEvent) -> Self {
        Self {
            request_id: event.request_id.clone(),
            author: event.author.clone(),
            action: event.action,
            from_branch: event.from_branch.clone(),
            to_branch: event.to_branch.clone(),
            timestamp: format_timestamp(event.timestamp),
        }
    }
}

impl From<CanonicalEvent> for EventView {
    fn from(event: CanonicalEvent) -> Self {
        let timestamp = format_timestamp(event.timestamp);
        Self {
            request_id: event.request_id,
            author: event.author,
            action: event.action,
            from_branch: event.from_branch,
            to_branch: event.to_branch,
            timestamp,
        }
    }
}
