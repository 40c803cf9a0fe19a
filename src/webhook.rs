//! Webhook classification and field extraction
//!
//! Inbound notifications are decoded once into [`WebhookEvent`] from the
//! `X-GitHub-Event` tag and the payload's own `action` field, then matched
//! exhaustively. Extraction never fails: every absent or mistyped field
//! resolves to its documented default.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::event::{CanonicalEvent, EventAction};
use crate::utils::{bool_at, id_at, str_at};

/// Header carrying the event-type tag
pub const EVENT_HEADER: &str = "X-GitHub-Event";

const BRANCH_REF_PREFIX: &str = "refs/heads/";
const SHORT_SHA_LEN: usize = 7;
const UNKNOWN: &str = "Unknown";

/// Tracked kinds of webhook notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Push,
    PullRequestOpened,
    PullRequestClosed,
    /// Anything else: other tags, other pull request actions, missing tag
    Other {
        tag: Option<String>,
        action: Option<String>,
    },
}

impl WebhookEvent {
    /// Classify an inbound notification by its tag and payload `action`.
    pub fn decode(tag: Option<&str>, payload: &Value) -> Self {
        let action = str_at(payload, &["action"]);
        match (tag, action) {
            (Some("push"), _) => WebhookEvent::Push,
            (Some("pull_request"), Some("opened")) => WebhookEvent::PullRequestOpened,
            (Some("pull_request"), Some("closed")) => WebhookEvent::PullRequestClosed,
            _ => WebhookEvent::Other {
                tag: tag.map(String::from),
                action: action.map(String::from),
            },
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, WebhookEvent::Other { .. })
    }

    /// Run the extractor for this kind; untracked kinds produce no record.
    pub fn extract(&self, payload: &Value, received_at: DateTime<Utc>) -> Option<CanonicalEvent> {
        match self {
            WebhookEvent::Push => Some(extract_push(payload, received_at)),
            WebhookEvent::PullRequestOpened | WebhookEvent::PullRequestClosed => {
                Some(extract_pull_request(payload, received_at))
            }
            WebhookEvent::Other { .. } => None,
        }
    }
}

/// Build a record from a push payload.
pub fn extract_push(payload: &Value, received_at: DateTime<Utc>) -> CanonicalEvent {
    let request_id: String = str_at(payload, &["after"])
        .map(|sha| sha.chars().take(SHORT_SHA_LEN).collect())
        .unwrap_or_default();
    let branch_ref = str_at(payload, &["ref"]).unwrap_or_default();
    let to_branch = branch_ref
        .strip_prefix(BRANCH_REF_PREFIX)
        .unwrap_or(branch_ref)
        .to_string();

    CanonicalEvent {
        request_id,
        author: str_at(payload, &["pusher", "name"])
            .unwrap_or(UNKNOWN)
            .to_string(),
        action: EventAction::Push,
        from_branch: None,
        to_branch,
        timestamp: received_at,
    }
}

/// Build a record from a pull request payload.
/// A closed pull request that was merged becomes a MERGE, everything else a PULL_REQUEST.
pub fn extract_pull_request(payload: &Value, received_at: DateTime<Utc>) -> CanonicalEvent {
    let closed = str_at(payload, &["action"]) == Some("closed");
    let merged = bool_at(payload, &["pull_request", "merged"]).unwrap_or(false);
    let action = if closed && merged {
        EventAction::Merge
    } else {
        EventAction::PullRequest
    };

    let text_or_unknown = |path: &[&str]| str_at(payload, path).unwrap_or(UNKNOWN).to_string();

    CanonicalEvent {
        request_id: id_at(payload, &["pull_request", "number"]).unwrap_or_default(),
        author: text_or_unknown(&["pull_request", "user", "login"]),
        action,
        from_branch: Some(text_or_unknown(&["pull_request", "head", "ref"])),
        to_branch: text_or_unknown(&["pull_request", "base", "ref"]),
        timestamp: received_at,
    }
}

/// Select the extractor for a notification, or None when it is not tracked.
pub fn route(
    tag: Option<&str>,
    payload: &Value,
    received_at: DateTime<Utc>,
) -> Option<CanonicalEvent> {
    WebhookEvent::decode(tag, payload).extract(payload, received_at)
}
