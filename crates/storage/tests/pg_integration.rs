//! Integration tests for PgStorage.
//! Run with: DATABASE_URL=... cargo test -p pixelpost-storage -- --ignored pg_

#![allow(clippy::unwrap_used, reason = "test code")]

use chrono::{Duration, Utc};
use pixelpost_core::{EmailStatus, NewEmailMessage};
use pixelpost_storage::{EmailStore, PgStorage};
use uuid::Uuid;

async fn create_pg_storage() -> PgStorage {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgStorage integration tests");
    PgStorage::new(&url).await.expect("Failed to connect to PostgreSQL")
}

fn make_email(recipient: &str) -> NewEmailMessage {
    NewEmailMessage {
        recipient: recipient.to_owned(),
        subject: "Integration".to_owned(),
        body_html: "<p>hello</p>".to_owned(),
        tracking_token: Uuid::new_v4().simple().to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn pg_insert_and_fetch_round_trip() {
    let storage = create_pg_storage().await;
    let msg = storage.insert_message(make_email("pg-a@example.com")).await.unwrap();
    assert_eq!(msg.status, EmailStatus::Pending);

    let by_id = storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(by_id.recipient, "pg-a@example.com");
    let by_token = storage.find_by_token(&msg.tracking_token).await.unwrap().unwrap();
    assert_eq!(by_token.id, msg.id);
}

#[tokio::test]
#[ignore]
async fn pg_duplicate_token_maps_to_duplicate() {
    let storage = create_pg_storage().await;
    let first = make_email("pg-b@example.com");
    let mut second = make_email("pg-c@example.com");
    second.tracking_token = first.tracking_token.clone();

    storage.insert_message(first).await.unwrap();
    let err = storage.insert_message(second).await.unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
#[ignore]
async fn pg_transitions_follow_state_machine() {
    let storage = create_pg_storage().await;
    let msg = storage.insert_message(make_email("pg-d@example.com")).await.unwrap();

    assert!(!storage.mark_delivered(msg.id, Utc::now()).await.unwrap());
    let sent_at = Utc::now();
    assert!(storage.mark_sent(msg.id, sent_at).await.unwrap());
    assert!(storage.mark_delivered(msg.id, sent_at + Duration::milliseconds(500)).await.unwrap());
    assert!(!storage.mark_failed(msg.id, "late", Utc::now()).await.unwrap());

    let stored = storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmailStatus::Delivered);
    assert!(stored.last_error.is_none());
    assert!(stored.delivered_at.is_some());
}

#[tokio::test]
#[ignore]
async fn pg_read_before_send_keeps_read() {
    let storage = create_pg_storage().await;
    let msg = storage.insert_message(make_email("pg-e@example.com")).await.unwrap();

    assert!(storage.mark_read(msg.id, Utc::now()).await.unwrap());
    assert!(!storage.mark_read(msg.id, Utc::now()).await.unwrap());
    assert!(storage.mark_sent(msg.id, Utc::now()).await.unwrap());

    let stored = storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmailStatus::Read);
    assert!(stored.sent_at.is_some());
}

#[tokio::test]
#[ignore]
async fn pg_failure_after_open_keeps_read() {
    let storage = create_pg_storage().await;
    let msg = storage.insert_message(make_email("pg-g@example.com")).await.unwrap();

    assert!(storage.mark_read(msg.id, Utc::now()).await.unwrap());
    assert!(storage.mark_failed(msg.id, "Invalid email format.", Utc::now()).await.unwrap());

    let stored = storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmailStatus::Read);
    assert!(stored.failed_at.is_some());
    assert_eq!(stored.last_error.as_deref(), Some("Invalid email format."));
    assert!(!storage.mark_sent(msg.id, Utc::now()).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn pg_stats_count_inserted_rows() {
    let storage = create_pg_storage().await;
    let before = storage.queue_stats().await.unwrap();
    storage.insert_message(make_email("pg-f@example.com")).await.unwrap();
    let after = storage.queue_stats().await.unwrap();
    assert!(after.total() > before.total());
}
