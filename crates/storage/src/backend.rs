//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pixelpost_core::{EmailMessage, EmailStatus, NewEmailMessage, QueueStats, StatusTransition};

use crate::error::StorageError;
use crate::traits::EmailStore;

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Postgres(s) => <crate::PgStorage as EmailStore>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <crate::MemoryStorage as EmailStore>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Postgres(crate::PgStorage),
    Memory(crate::MemoryStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(crate::PgStorage::new(database_url).await?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(crate::MemoryStorage::new())
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl EmailStore for StorageBackend {
    async fn insert_message(&self, new: NewEmailMessage) -> Result<EmailMessage, StorageError> {
        dispatch!(self, insert_message(new))
    }

    async fn next_pending(&self) -> Result<Option<EmailMessage>, StorageError> {
        dispatch!(self, next_pending())
    }

    async fn get_message(&self, id: i64) -> Result<Option<EmailMessage>, StorageError> {
        dispatch!(self, get_message(id))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<EmailMessage>, StorageError> {
        dispatch!(self, find_by_token(token))
    }

    async fn apply_transition(
        &self,
        id: i64,
        transition: &StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        dispatch!(self, apply_transition(id, transition, at))
    }

    async fn list_messages(
        &self,
        status: Option<EmailStatus>,
        limit: usize,
    ) -> Result<Vec<EmailMessage>, StorageError> {
        dispatch!(self, list_messages(status, limit))
    }

    async fn queue_stats(&self) -> Result<QueueStats, StorageError> {
        dispatch!(self, queue_stats())
    }
}
