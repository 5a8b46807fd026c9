//! Storage backend trait abstraction
//!
//! One async trait covers the message store: insertion, the FIFO pending
//! cursor used by the delivery worker, guarded status transitions and the
//! read-only queries behind the HTTP API and the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pixelpost_core::{EmailMessage, EmailStatus, NewEmailMessage, QueueStats, StatusTransition};

use crate::error::StorageError;

/// Persistent message store.
///
/// Transition methods return `Ok(false)` when the row is missing or the
/// status guard rejects the change; the row is then left untouched.
#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Insert a new `Pending` message. Fails with `DuplicateToken` on token collision.
    async fn insert_message(&self, new: NewEmailMessage) -> Result<EmailMessage, StorageError>;

    /// Oldest `Pending` message (lowest id), if any.
    async fn next_pending(&self) -> Result<Option<EmailMessage>, StorageError>;

    async fn get_message(&self, id: i64) -> Result<Option<EmailMessage>, StorageError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<EmailMessage>, StorageError>;

    /// Apply `transition` to message `id` at time `at`.
    async fn apply_transition(
        &self,
        id: i64,
        transition: &StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Newest first, optionally filtered by status.
    async fn list_messages(
        &self,
        status: Option<EmailStatus>,
        limit: usize,
    ) -> Result<Vec<EmailMessage>, StorageError>;

    async fn queue_stats(&self) -> Result<QueueStats, StorageError>;

    async fn mark_sent(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StorageError> {
        self.apply_transition(id, &StatusTransition::Sent, at).await
    }

    async fn mark_delivered(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StorageError> {
        self.apply_transition(id, &StatusTransition::Delivered, at).await
    }

    async fn mark_failed(
        &self,
        id: i64,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.apply_transition(id, &StatusTransition::Failed { error: error.to_owned() }, at).await
    }

    async fn mark_read(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StorageError> {
        self.apply_transition(id, &StatusTransition::Read, at).await
    }
}
