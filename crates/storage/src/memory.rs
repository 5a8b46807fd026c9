use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pixelpost_core::{EmailMessage, EmailStatus, NewEmailMessage, QueueStats, StatusTransition};

use crate::error::StorageError;
use crate::traits::EmailStore;

/// In-memory message store.
///
/// Messages live in a `BTreeMap` keyed by id behind an `RwLock`, so the
/// pending cursor is an ordered scan. Intended for tests and for running
/// `serve` without a database; nothing survives a restart.
///
/// Writes can be switched off with [`MemoryStorage::set_writes_enabled`] to
/// exercise persistence-failure paths.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    messages: Arc<RwLock<BTreeMap<i64, EmailMessage>>>,
    next_id: Arc<AtomicI64>,
    writes_enabled: Arc<AtomicBool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            writes_enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Recovers gracefully if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_writes_enabled(&self, enabled: bool) {
        self.writes_enabled.store(enabled, Ordering::SeqCst);
    }

    fn ensure_writable(&self) -> Result<(), StorageError> {
        if self.writes_enabled.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("writes disabled".to_owned()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailStore for MemoryStorage {
    async fn insert_message(&self, new: NewEmailMessage) -> Result<EmailMessage, StorageError> {
        self.ensure_writable()?;
        let mut messages = self.messages.write().unwrap_or_else(PoisonError::into_inner);
        if messages.values().any(|m| m.tracking_token == new.tracking_token) {
            return Err(StorageError::DuplicateToken(new.tracking_token));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = new.into_message(id, Utc::now());
        messages.insert(id, message.clone());
        Ok(message)
    }

    async fn next_pending(&self) -> Result<Option<EmailMessage>, StorageError> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(messages.values().find(|m| m.awaiting_delivery()).cloned())
    }

    async fn get_message(&self, id: i64) -> Result<Option<EmailMessage>, StorageError> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(messages.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<EmailMessage>, StorageError> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(messages.values().find(|m| m.tracking_token == token).cloned())
    }

    async fn apply_transition(
        &self,
        id: i64,
        transition: &StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.ensure_writable()?;
        let mut messages = self.messages.write().unwrap_or_else(PoisonError::into_inner);
        Ok(messages.get_mut(&id).is_some_and(|m| m.apply(transition, at)))
    }

    async fn list_messages(
        &self,
        status: Option<EmailStatus>,
        limit: usize,
    ) -> Result<Vec<EmailMessage>, StorageError> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(messages
            .values()
            .rev()
            .filter(|m| status.is_none_or(|s| m.status == s))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn queue_stats(&self) -> Result<QueueStats, StorageError> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = QueueStats::default();
        for message in messages.values() {
            stats.record(message.status, 1);
        }
        Ok(stats)
    }
}
