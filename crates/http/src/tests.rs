use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use pixelpost_core::{AppConfig, EmailStatus, TRACKING_PIXEL_GIF};
use pixelpost_service::{EnqueueService, EventLog, TrackingService};
use pixelpost_storage::{EmailStore, StorageBackend};
use tower::ServiceExt;

use crate::{create_router, AppState};

struct TestApp {
    router: Router,
    storage: Arc<StorageBackend>,
    enqueue: Arc<EnqueueService>,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(StorageBackend::new_memory());
    let enqueue = Arc::new(EnqueueService::new(
        Arc::clone(&storage),
        AppConfig::new("http://localhost:8080"),
    ));
    let tracking =
        Arc::new(TrackingService::new(Arc::clone(&storage), EventLog::new(dir.path())));
    let state = Arc::new(AppState {
        storage: Arc::clone(&storage),
        enqueue_service: Arc::clone(&enqueue),
        tracking_service: tracking,
    });
    TestApp { router: create_router(state), storage, enqueue, _dir: dir }
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(router: &Router, uri: &str, json: serde_json::Value) -> axum::response::Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app();
    let response = get(&app.router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn pixel_marks_read_once_and_returns_gif() {
    let app = test_app();
    let msg = app.enqueue.enqueue("alice@example.com", "Hi", "<p>hi</p>").await.unwrap();
    let uri = format!("/t/{}", msg.tracking_token);

    let first = get(&app.router, &uri).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(first.headers()[header::CACHE_CONTROL], "no-store, no-cache, must-revalidate");
    let first_body = to_bytes(first.into_body(), usize::MAX).await.unwrap();
    assert_eq!(first_body.as_ref(), TRACKING_PIXEL_GIF.as_slice());
    assert_eq!(first_body.len(), 43);

    let read = app.storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(read.status, EmailStatus::Read);
    let read_at = read.read_at;

    let second = get(&app.router, &uri).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = to_bytes(second.into_body(), usize::MAX).await.unwrap();
    assert_eq!(second_body, first_body);
    let again = app.storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(again.read_at, read_at);
}

#[tokio::test]
async fn unknown_token_still_gets_pixel() {
    let app = test_app();
    let msg = app.enqueue.enqueue("alice@example.com", "Hi", "<p>hi</p>").await.unwrap();

    let response = get(&app.router, "/t/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 43);

    let stored = app.storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(stored, msg);
}

#[tokio::test]
async fn post_enqueues_pending_message() {
    let app = test_app();
    let response = post_json(
        &app.router,
        "/api/emails",
        serde_json::json!({"to": "bob@example.com", "subject": "Hello", "body": "<p>hey</p>"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pending");
    let id = json["id"].as_i64().unwrap();

    let stored = app.storage.get_message(id).await.unwrap().unwrap();
    assert_eq!(stored.recipient, "bob@example.com");
    assert!(stored.body_html.contains(&format!(
        "http://localhost:8080/t/{}",
        json["tracking_token"].as_str().unwrap()
    )));
}

#[tokio::test]
async fn post_rejects_oversized_subject() {
    let app = test_app();
    let response = post_json(
        &app.router,
        "/api/emails",
        serde_json::json!({"to": "bob@example.com", "subject": "x".repeat(201), "body": "b"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("subject"));
}

#[tokio::test]
async fn get_list_and_stats() {
    let app = test_app();
    let a = app.enqueue.enqueue("a@example.com", "s", "b").await.unwrap();
    let b = app.enqueue.enqueue("b@example.com", "s", "b").await.unwrap();
    app.storage.mark_failed(a.id, "Invalid email format.", Utc::now()).await.unwrap();

    let one = body_json(get(&app.router, &format!("/api/emails/{}", b.id)).await).await;
    assert_eq!(one["recipient"], "b@example.com");

    let missing = get(&app.router, "/api/emails/9999").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let failed = body_json(get(&app.router, "/api/emails?status=failed").await).await;
    assert_eq!(failed["count"], 1);
    assert_eq!(failed["emails"][0]["last_error"], "Invalid email format.");

    let stats = body_json(get(&app.router, "/api/emails/stats").await).await;
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["failed"], 1);
    assert_eq!(stats["total"], 2);
}

#[tokio::test]
async fn enqueue_against_refusing_store_is_503() {
    let app = test_app();
    let StorageBackend::Memory(memory) = app.storage.as_ref() else {
        panic!("test app uses the memory store");
    };
    memory.set_writes_enabled(false);

    let response = post_json(
        &app.router,
        "/api/emails",
        serde_json::json!({"to": "bob@example.com", "subject": "Hi", "body": "<p>hi</p>"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "storage temporarily unavailable");
}

#[tokio::test]
async fn pixel_is_served_when_store_refuses_writes() {
    let app = test_app();
    let msg = app.enqueue.enqueue("alice@example.com", "Hi", "<p>hi</p>").await.unwrap();
    let StorageBackend::Memory(memory) = app.storage.as_ref() else {
        panic!("test app uses the memory store");
    };
    memory.set_writes_enabled(false);

    let response = get(&app.router, &format!("/t/{}", msg.tracking_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 43);
    assert_eq!(body.as_ref(), TRACKING_PIXEL_GIF.as_slice());

    let stored = app.storage.get_message(msg.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EmailStatus::Pending);
    assert!(stored.read_at.is_none());
}
