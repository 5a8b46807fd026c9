use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use pixelpost_core::{EmailMessage, EmailStatus};
use pixelpost_storage::{EmailStore, StorageBackend};

use crate::event_log::EventLog;
use crate::ServiceError;

/// Records message opens reported by the tracking pixel.
pub struct TrackingService {
    storage: Arc<StorageBackend>,
    events: EventLog,
}

impl TrackingService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, events: EventLog) -> Self {
        Self { storage, events }
    }

    /// Marks the message owning `token` as read on its first open.
    ///
    /// Returns the updated message when this call recorded the open, `None`
    /// for unknown tokens and repeat opens.
    pub async fn record_open(&self, token: &str) -> Result<Option<EmailMessage>, ServiceError> {
        let Some(message) = self.storage.find_by_token(token).await? else {
            tracing::debug!("tracking hit for unknown token");
            return Ok(None);
        };
        if message.status == EmailStatus::Read {
            return Ok(None);
        }
        let read_at = Utc::now();
        if !self.storage.mark_read(message.id, read_at).await? {
            return Ok(None);
        }
        self.events
            .info(&format!(
                "Email {} READ by {} at {}",
                message.id,
                message.recipient,
                read_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ))
            .await;
        Ok(self.storage.get_message(message.id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use pixelpost_core::NewEmailMessage;

    use super::*;

    async fn seeded() -> (TrackingService, Arc<StorageBackend>, EmailMessage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(StorageBackend::new_memory());
        let msg = storage
            .insert_message(NewEmailMessage {
                recipient: "alice@example.com".to_owned(),
                subject: "Hi".to_owned(),
                body_html: "<p>hi</p>".to_owned(),
                tracking_token: "tok123".to_owned(),
            })
            .await
            .unwrap();
        let service = TrackingService::new(Arc::clone(&storage), EventLog::new(dir.path()));
        (service, storage, msg, dir)
    }

    #[tokio::test]
    async fn first_open_wins() {
        let (service, storage, msg, _dir) = seeded().await;
        storage.mark_sent(msg.id, Utc::now()).await.unwrap();

        let opened = service.record_open("tok123").await.unwrap().unwrap();
        assert_eq!(opened.status, EmailStatus::Read);
        let first_read_at = opened.read_at;
        assert!(first_read_at.is_some());

        assert!(service.record_open("tok123").await.unwrap().is_none());
        let stored = storage.get_message(msg.id).await.unwrap().unwrap();
        assert_eq!(stored.read_at, first_read_at);
    }

    #[tokio::test]
    async fn unknown_token_mutates_nothing() {
        let (service, storage, msg, dir) = seeded().await;
        assert!(service.record_open("missing").await.unwrap().is_none());
        let stored = storage.get_message(msg.id).await.unwrap().unwrap();
        assert_eq!(stored, msg);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn open_is_logged() {
        let (service, _storage, msg, dir) = seeded().await;
        service.record_open("tok123").await.unwrap();
        let log = std::fs::read_to_string(EventLog::new(dir.path()).current_file()).unwrap();
        assert!(log.contains(&format!("Email {} READ by alice@example.com at ", msg.id)));
    }
}
