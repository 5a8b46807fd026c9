//! Background delivery worker.
//!
//! Single writer: exactly one worker per store is assumed. No lease or row
//! lock is taken, and each store access is an independent read-modify-write.
//! Running two workers against one database may submit a message twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use pixelpost_core::{EmailMessage, RelayConfig, WorkerConfig};
use pixelpost_storage::{EmailStore, StorageBackend};
use tokio::sync::watch;

use crate::error::DeliveryError;
use crate::event_log::EventLog;
use crate::notifier::AdminNotifier;
use crate::relay::{OutboundEmail, Relay};
use crate::templates::delivery_html;
use crate::validation::{MxLookup, ValidationPipeline};
use crate::ServiceError;

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Submitted and recorded as sent.
    Sent,
    /// Submitted, recorded as sent and auto-advanced.
    Delivered,
    /// Submitted, but the sent status could not be recorded.
    Unrecorded { error: String },
    /// Rejected by validation or by the relay.
    Failed { reason: String, recorded: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub id: i64,
    pub recipient: String,
    pub outcome: DeliveryOutcome,
}

pub struct DeliveryWorker {
    storage: Arc<StorageBackend>,
    validator: ValidationPipeline,
    relay: Arc<dyn Relay>,
    notifier: AdminNotifier,
    events: EventLog,
    config: WorkerConfig,
    assume_delivered_on_send: bool,
}

impl DeliveryWorker {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        relay: Arc<dyn Relay>,
        mx: Arc<dyn MxLookup>,
        relay_config: &RelayConfig,
        config: WorkerConfig,
    ) -> Self {
        let events = EventLog::new(config.log_dir.clone());
        let validator = ValidationPipeline::new(config.disposable_domains.clone(), mx);
        let notifier =
            AdminNotifier::new(Arc::clone(&relay), relay_config.admin_address(), events.clone());
        Self {
            storage,
            validator,
            relay,
            notifier,
            events,
            config,
            assume_delivered_on_send: relay_config.assume_delivered_on_send,
        }
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Runs until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Sleeps are cut short by shutdown; a relay submit already in flight
    /// completes first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        self.events.info("Email worker started.").await;
        while !*shutdown.borrow() {
            let pause = match self.process_next(&mut shutdown).await {
                Ok(Some(report)) => {
                    tracing::debug!(id = report.id, outcome = ?report.outcome, "message processed");
                    self.config.iteration_delay
                },
                Ok(None) => {
                    self.events.info("No emails to send at this time.").await;
                    self.config.idle_interval
                },
                Err(e) => {
                    self.events.error(&format!("Worker loop error: {e}")).await;
                    self.config.iteration_delay
                },
            };
            if !sleep_or_shutdown(pause, &mut shutdown).await {
                break;
            }
        }
        self.events.info("Email worker stopped.").await;
    }

    /// Delivers the oldest queued message, if any.
    ///
    /// Per-message failures are folded into the report; only a failure to
    /// read the queue is returned as an error.
    pub async fn process_next(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Option<DeliveryReport>, ServiceError> {
        let Some(message) = self.storage.next_pending().await? else {
            return Ok(None);
        };
        let outcome = match self.deliver(&message).await {
            Ok(()) => self.record_success(&message, shutdown).await,
            Err(e) => self.record_failure(&message, &e.to_string()).await,
        };
        Ok(Some(DeliveryReport { id: message.id, recipient: message.recipient, outcome }))
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        self.validator.validate(&message.recipient).await?;
        let outbound = OutboundEmail {
            to: message.recipient.clone(),
            subject: message.subject.clone(),
            html_body: delivery_html(&message.recipient, &message.body_html),
        };
        self.relay.submit(&outbound).await?;
        Ok(())
    }

    async fn record_success(
        &self,
        message: &EmailMessage,
        shutdown: &mut watch::Receiver<bool>,
    ) -> DeliveryOutcome {
        let sent_at = Utc::now();
        match self.storage.mark_sent(message.id, sent_at).await {
            Ok(true) => {},
            Ok(false) => {
                let error = "status changed before it could be marked sent".to_owned();
                self.log_status_update_failure(message.id, &error).await;
                return DeliveryOutcome::Unrecorded { error };
            },
            Err(e) => {
                let error = e.to_string();
                self.log_status_update_failure(message.id, &error).await;
                return DeliveryOutcome::Unrecorded { error };
            },
        }
        self.events
            .info(&format!(
                "Email {} SENT to {} at {}",
                message.id,
                message.recipient,
                format_ts(sent_at)
            ))
            .await;

        // Relay courtesy pause; shutdown only shortens it.
        sleep_or_shutdown(self.config.inter_send_delay, shutdown).await;

        if !self.assume_delivered_on_send {
            return DeliveryOutcome::Sent;
        }
        let delivered_at = Utc::now().max(sent_at);
        match self.storage.mark_delivered(message.id, delivered_at).await {
            Ok(true) => {
                self.events
                    .info(&format!(
                        "Email {} DELIVERED to {} at {}",
                        message.id,
                        message.recipient,
                        format_ts(delivered_at)
                    ))
                    .await;
                DeliveryOutcome::Delivered
            },
            Ok(false) => {
                tracing::warn!(id = message.id, "delivered transition rejected");
                DeliveryOutcome::Sent
            },
            Err(e) => {
                self.log_status_update_failure(message.id, &e.to_string()).await;
                DeliveryOutcome::Sent
            },
        }
    }

    async fn record_failure(&self, message: &EmailMessage, reason: &str) -> DeliveryOutcome {
        match self.storage.mark_failed(message.id, reason, Utc::now()).await {
            Ok(applied) => {
                self.events
                    .error(&format!(
                        "Failed to send email {} to {}: {reason}",
                        message.id, message.recipient
                    ))
                    .await;
                if applied {
                    self.notifier.notify(&message.recipient, reason).await;
                } else {
                    tracing::warn!(id = message.id, "failed transition rejected");
                }
                DeliveryOutcome::Failed { reason: reason.to_owned(), recorded: applied }
            },
            Err(e) => {
                self.events
                    .error(&format!("Failed to update email as failed for {}: {e}", message.id))
                    .await;
                DeliveryOutcome::Failed { reason: reason.to_owned(), recorded: false }
            },
        }
    }

    async fn log_status_update_failure(&self, id: i64, error: &str) {
        self.events.error(&format!("Failed to update email status for {id}: {error}")).await;
    }
}

/// Returns `false` when shutdown was requested before `duration` elapsed.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
