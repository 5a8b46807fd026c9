use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pixelpost_core::EmailMessage;
use pixelpost_storage::EmailStore;

use crate::api_error::ApiError;
use crate::query_types::{EnqueueRequest, ListQuery};
use crate::response_types::{EmailListResponse, EnqueueResponse, StatsResponse};
use crate::AppState;

pub async fn enqueue_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let message = state.enqueue_service.compose(&req.to, &req.subject, &req.body).await?;
    Ok((StatusCode::ACCEPTED, Json(EnqueueResponse::from(&message))))
}

pub async fn get_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EmailMessage>, ApiError> {
    state
        .storage
        .get_message(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("email {id} not found")))
}

pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EmailListResponse>, ApiError> {
    let emails = state.storage.list_messages(query.status, query.capped_limit()).await?;
    Ok(Json(EmailListResponse { count: emails.len(), emails }))
}

pub async fn email_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.storage.queue_stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
