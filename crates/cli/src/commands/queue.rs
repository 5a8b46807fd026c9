use std::sync::Arc;

use anyhow::Result;
use pixelpost_core::{AppConfig, EmailStatus, MAX_LIST_LIMIT};
use pixelpost_http::{EmailListResponse, EnqueueResponse, StatsResponse};
use pixelpost_service::EnqueueService;
use pixelpost_storage::EmailStore;

use crate::open_storage;

pub(crate) async fn enqueue(to: &str, subject: &str, body: &str) -> Result<()> {
    let storage = Arc::new(open_storage().await?);
    let service = EnqueueService::new(storage, AppConfig::from_env());
    let message = service.compose(to, subject, body).await?;
    println!("{}", serde_json::to_string_pretty(&EnqueueResponse::from(&message))?);
    Ok(())
}

pub(crate) async fn show(id: i64) -> Result<()> {
    let storage = open_storage().await?;
    match storage.get_message(id).await? {
        Some(message) => println!("{}", serde_json::to_string_pretty(&message)?),
        None => println!("Email not found: {id}"),
    }
    Ok(())
}

pub(crate) async fn list(status: Option<EmailStatus>, limit: usize) -> Result<()> {
    let storage = open_storage().await?;
    let emails = storage.list_messages(status, limit.min(MAX_LIST_LIMIT)).await?;
    let count = emails.len();
    println!("{}", serde_json::to_string_pretty(&EmailListResponse { emails, count })?);
    Ok(())
}

pub(crate) async fn stats() -> Result<()> {
    let storage = open_storage().await?;
    let stats = storage.queue_stats().await?;
    println!("{}", serde_json::to_string_pretty(&StatsResponse::from(stats))?);
    Ok(())
}
