//! Ingestion and listing against an in-memory event store

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use std::collections::HashSet;
use tokio::task::JoinSet;

use git_event_monitor::db::{SqlEventStore, open_in_memory};
use git_event_monitor::error::MonitorError;
use git_event_monitor::event::{CanonicalEvent, EventAction};
use git_event_monitor::ingest::{HealthReport, IngestOutcome, IngestService};
use git_event_monitor::utils::format_timestamp;

async fn setup_service() -> IngestService {
    let pool = open_in_memory().await.unwrap();
    IngestService::new(SqlEventStore::new(pool))
}

fn push_payload() -> Value {
    json!({
        "ref": "refs/heads/main",
        "after": "abcdef1234",
        "pusher": { "name": "alice" }
    })
}

fn merged_pr_payload() -> Value {
    json!({
        "action": "closed",
        "pull_request": {
            "number": 42,
            "merged": true,
            "user": { "login": "bob" },
            "head": { "ref": "feature-x" },
            "base": { "ref": "main" }
        }
    })
}

fn instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

#[tokio::test]
async fn test_push_is_stored() {
    let service = setup_service().await;

    let outcome = service.ingest(Some("push"), &push_payload()).await.unwrap();
    let IngestOutcome::Stored { id, event } = outcome else {
        panic!("push should be stored");
    };
    assert!(!id.is_empty());
    assert_eq!(event.action, EventAction::Push);
    assert_eq!(event.to_branch, "main");
    assert_eq!(event.request_id, "abcdef1");
    assert_eq!(event.author, "alice");
    assert_eq!(event.from_branch, None);

    let stored = service.store().list_all().await.unwrap();
    assert_eq!(stored, vec![event]);
}

#[tokio::test]
async fn test_merged_pull_request_is_stored() {
    let service = setup_service().await;
    let at = instant(9);

    let outcome = service
        .ingest_at(Some("pull_request"), &merged_pr_payload(), at)
        .await
        .unwrap();

    let IngestOutcome::Stored { event, .. } = outcome else {
        panic!("merged pull request should be stored");
    };
    assert_eq!(
        event,
        CanonicalEvent {
            request_id: "42".to_string(),
            author: "bob".to_string(),
            action: EventAction::Merge,
            from_branch: Some("feature-x".to_string()),
            to_branch: "main".to_string(),
            timestamp: at,
        }
    );
    assert_eq!(service.store().list_all().await.unwrap(), vec![event]);
}

#[tokio::test]
async fn test_stored_timestamp_keeps_full_precision() {
    let service = setup_service().await;
    let at = instant(10) + Duration::nanoseconds(123_456_789);

    let outcome = service
        .ingest_at(Some("push"), &push_payload(), at)
        .await
        .unwrap();
    let IngestOutcome::Stored { event, .. } = outcome else {
        panic!("push should be stored");
    };
    assert_eq!(event.timestamp, at);

    let stored = service.store().list_all().await.unwrap();
    assert_eq!(stored, vec![event]);
    assert_eq!(stored[0].timestamp, at);
}

#[tokio::test]
async fn test_concurrent_ingests_each_store_one_record() {
    let service = setup_service().await;
    const DELIVERIES: usize = 16;

    let mut tasks = JoinSet::new();
    for _ in 0..DELIVERIES {
        let service = service.clone();
        tasks.spawn(async move { service.ingest(Some("push"), &push_payload()).await });
    }

    let mut ids = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            IngestOutcome::Stored { id, .. } => assert!(ids.insert(id)),
            IngestOutcome::Ignored => panic!("push should be stored"),
        }
    }

    assert_eq!(ids.len(), DELIVERIES);
    assert_eq!(service.store().count().await.unwrap(), DELIVERIES as i64);
}

#[tokio::test]
async fn test_untracked_events_are_ignored() {
    let service = setup_service().await;

    let labeled = json!({ "action": "labeled", "pull_request": { "number": 1 } });
    assert_eq!(
        service.ingest(Some("pull_request"), &labeled).await.unwrap(),
        IngestOutcome::Ignored
    );
    assert_eq!(
        service.ingest(Some("issues"), &push_payload()).await.unwrap(),
        IngestOutcome::Ignored
    );
    assert_eq!(
        service.ingest(None, &push_payload()).await.unwrap(),
        IngestOutcome::Ignored
    );

    assert_eq!(service.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let service = setup_service().await;

    let result = service.ingest_body(Some("push"), b"{not json").await;
    assert!(matches!(result, Err(MonitorError::InvalidPayload(_))));
    assert_eq!(service.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_deliveries_are_both_stored() {
    let service = setup_service().await;

    let first = service.ingest(Some("push"), &push_payload()).await.unwrap();
    let second = service.ingest(Some("push"), &push_payload()).await.unwrap();

    match (first, second) {
        (IngestOutcome::Stored { id: a, .. }, IngestOutcome::Stored { id: b, .. }) => {
            assert_ne!(a, b)
        }
        other => panic!("expected two stored events, got {:?}", other),
    }
    assert_eq!(service.store().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_newest_first_with_formatted_timestamps() {
    let service = setup_service().await;
    let t1 = instant(8);
    let t2 = instant(15);

    service
        .ingest_at(Some("push"), &push_payload(), t1)
        .await
        .unwrap();
    service
        .ingest_at(Some("pull_request"), &merged_pr_payload(), t2)
        .await
        .unwrap();

    let events = service.list_events().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, EventAction::Merge);
    assert_eq!(events[0].timestamp, "1st May 2024 - 03:00 PM UTC");
    assert_eq!(events[1].action, EventAction::Push);
    assert_eq!(events[1].timestamp, "1st May 2024 - 08:00 AM UTC");

    // The stored record keeps the raw instant
    let stored = service.store().list_all().await.unwrap();
    assert_eq!(stored[0].timestamp, t2);
    assert_eq!(stored[1].timestamp, t1);
}

#[tokio::test]
async fn test_list_orders_out_of_order_inserts() {
    let service = setup_service().await;
    let base = instant(12);
    let offsets = [5, -3, 0, 12, -7, 1];

    for offset in offsets {
        service
            .ingest_at(Some("push"), &push_payload(), base + Duration::minutes(offset))
            .await
            .unwrap();
    }

    let stored = service.store().list_all().await.unwrap();
    assert_eq!(stored.len(), offsets.len());
    assert!(stored.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let views = service.list_events().await.unwrap();
    let expected: Vec<String> = stored.iter().map(|e| format_timestamp(e.timestamp)).collect();
    let actual: Vec<String> = views.into_iter().map(|v| v.timestamp).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_equal_timestamps_list_latest_insert_first() {
    let service = setup_service().await;
    let at = instant(10);

    service
        .ingest_at(Some("push"), &push_payload(), at)
        .await
        .unwrap();
    service
        .ingest_at(Some("pull_request"), &merged_pr_payload(), at)
        .await
        .unwrap();

    let stored = service.store().list_all().await.unwrap();
    assert_eq!(stored[0].action, EventAction::Merge);
    assert_eq!(stored[1].action, EventAction::Push);
}

#[tokio::test]
async fn test_health_follows_store_lifecycle() {
    let service = setup_service().await;
    assert_eq!(service.health().await, HealthReport::Healthy);

    service.store().close().await;
    assert!(matches!(
        service.health().await,
        HealthReport::Unhealthy { .. }
    ));

    let result = service.ingest(Some("push"), &push_payload()).await;
    assert!(matches!(result, Err(MonitorError::DatabaseError(_))));
}
