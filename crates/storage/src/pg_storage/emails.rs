//! EmailStore implementation for PgStorage.

use super::*;

use async_trait::async_trait;
use pixelpost_core::{NewEmailMessage, QueueStats, StatusTransition};

use crate::traits::EmailStore;

/// Mirrors `EmailMessage::awaiting_delivery`.
const AWAITING_DELIVERY: &str = "(status = 'pending'
          OR (status = 'read' AND sent_at IS NULL AND failed_at IS NULL))";

// Each guard mirrors `StatusTransition::allowed_from`; stamps are write-once.
fn mark_sent_sql() -> String {
    format!(
        "UPDATE email_messages
       SET status = CASE WHEN status = 'read' THEN 'read' ELSE 'sent' END,
           sent_at = COALESCE(sent_at, $2)
       WHERE id = $1
         AND {AWAITING_DELIVERY}"
    )
}

const MARK_DELIVERED_SQL: &str = "UPDATE email_messages
       SET status = CASE WHEN status = 'read' THEN 'read' ELSE 'delivered' END,
           delivered_at = COALESCE(delivered_at, $2)
       WHERE id = $1
         AND (status = 'sent'
              OR (status = 'read' AND sent_at IS NOT NULL AND delivered_at IS NULL))";

fn mark_failed_sql() -> String {
    format!(
        "UPDATE email_messages
       SET status = CASE WHEN status = 'read' THEN 'read' ELSE 'failed' END,
           failed_at = COALESCE(failed_at, $2),
           last_error = $3
       WHERE id = $1
         AND {AWAITING_DELIVERY}"
    )
}

const MARK_READ_SQL: &str = "UPDATE email_messages
       SET status = 'read',
           read_at = COALESCE(read_at, $2)
       WHERE id = $1 AND status <> 'read'";

#[async_trait]
impl EmailStore for PgStorage {
    async fn insert_message(&self, new: NewEmailMessage) -> Result<EmailMessage, StorageError> {
        let row = sqlx::query(&format!(
            "INSERT INTO email_messages (recipient, subject, body_html, status, tracking_token)
               VALUES ($1, $2, $3, 'pending', $4)
               RETURNING {EMAIL_COLUMNS}"
        ))
        .bind(&new.recipient)
        .bind(&new.subject)
        .bind(&new.body_html)
        .bind(&new.tracking_token)
        .fetch_one(&self.pool)
        .await?;
        row_to_email(&row)
    }

    async fn next_pending(&self) -> Result<Option<EmailMessage>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {EMAIL_COLUMNS} FROM email_messages
               WHERE {AWAITING_DELIVERY}
               ORDER BY id ASC
               LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_email).transpose()
    }

    async fn get_message(&self, id: i64) -> Result<Option<EmailMessage>, StorageError> {
        let row = sqlx::query(&format!("SELECT {EMAIL_COLUMNS} FROM email_messages WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_email).transpose()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<EmailMessage>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {EMAIL_COLUMNS} FROM email_messages WHERE tracking_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_email).transpose()
    }

    async fn apply_transition(
        &self,
        id: i64,
        transition: &StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = match transition {
            StatusTransition::Sent => {
                sqlx::query(&mark_sent_sql()).bind(id).bind(at).execute(&self.pool).await?
            },
            StatusTransition::Delivered => {
                sqlx::query(MARK_DELIVERED_SQL).bind(id).bind(at).execute(&self.pool).await?
            },
            StatusTransition::Failed { error } => {
                sqlx::query(&mark_failed_sql())
                    .bind(id)
                    .bind(at)
                    .bind(error)
                    .execute(&self.pool)
                    .await?
            },
            StatusTransition::Read => {
                sqlx::query(MARK_READ_SQL).bind(id).bind(at).execute(&self.pool).await?
            },
        };
        let applied = result.rows_affected() > 0;
        if !applied {
            tracing::debug!(id, transition = transition.name(), "status transition not applied");
        }
        Ok(applied)
    }

    async fn list_messages(
        &self,
        status: Option<EmailStatus>,
        limit: usize,
    ) -> Result<Vec<EmailMessage>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {EMAIL_COLUMNS} FROM email_messages
               WHERE ($1::TEXT IS NULL OR status = $1)
               ORDER BY id DESC
               LIMIT $2"
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_email).collect()
    }

    async fn queue_stats(&self) -> Result<QueueStats, StorageError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM email_messages GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut stats = QueueStats::default();
        for row in &rows {
            let status: EmailStatus = row.try_get::<String, _>("status")?.parse()?;
            let count: i64 = row.try_get("count")?;
            stats.record(status, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }
}
