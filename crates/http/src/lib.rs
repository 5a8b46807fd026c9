//! HTTP API server for pixelpost.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
mod handlers;
mod query_types;
mod response_types;
#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use pixelpost_service::{DeliveryWorker, EnqueueService, TrackingService};
use pixelpost_storage::StorageBackend;

pub use query_types::{EnqueueRequest, ListQuery};
pub use response_types::{EmailListResponse, EnqueueResponse, StatsResponse};

/// Spawns the delivery worker as the single background task owning the queue.
///
/// The task ends once `shutdown` flips to `true`.
pub fn start_delivery_worker(
    worker: Arc<DeliveryWorker>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move { worker.run(shutdown).await })
}

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Read-only queries (show, list, stats)
    pub storage: Arc<StorageBackend>,
    /// Compose surface
    pub enqueue_service: Arc<EnqueueService>,
    /// Pixel hits
    pub tracking_service: Arc<TrackingService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/t/{token}", get(handlers::tracking::track_open))
        .route(
            "/api/emails",
            post(handlers::emails::enqueue_email).get(handlers::emails::list_emails),
        )
        .route("/api/emails/stats", get(handlers::emails::email_stats))
        .route("/api/emails/{id}", get(handlers::emails::get_email))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
