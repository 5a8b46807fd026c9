//! PostgreSQL storage backend using sqlx.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "DB row counts are bounded by PostgreSQL limits"
)]

mod emails;

use std::time::Duration;

use chrono::{DateTime, Utc};
use pixelpost_core::{
    EmailMessage, EmailStatus, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::StorageError;
use crate::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and apply migrations.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(StorageError::Migration)?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) const EMAIL_COLUMNS: &str =
    "id, recipient, subject, body_html, status, created_at, sent_at, delivered_at,
     read_at, failed_at, last_error, tracking_token, provider_message_id";

pub(crate) fn row_to_email(row: &PgRow) -> Result<EmailMessage, StorageError> {
    let status: EmailStatus = row.try_get::<String, _>("status")?.parse()?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(EmailMessage {
        id: row.try_get("id")?,
        recipient: row.try_get("recipient")?,
        subject: row.try_get("subject")?,
        body_html: row.try_get("body_html")?,
        status,
        created_at,
        sent_at: row.try_get("sent_at")?,
        delivered_at: row.try_get("delivered_at")?,
        read_at: row.try_get("read_at")?,
        failed_at: row.try_get("failed_at")?,
        last_error: row.try_get("last_error")?,
        tracking_token: row.try_get("tracking_token")?,
        provider_message_id: row.try_get("provider_message_id")?,
    })
}

/// Convert `usize` to `i64` for SQL LIMIT binds.
/// Saturates to `i64::MAX` on overflow (only possible on 128-bit targets).
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}
