//! Queued email model and its delivery status state machine.
//!
//! Two axes share the single `status` column: the delivery axis
//! (`Pending → Sent → Delivered`, `Pending → Failed`) driven by the worker, and
//! the observational `Read` flag set by the tracking endpoint. Read does not
//! imply Sent; a message that is already `Read` keeps that status while the
//! worker still records its `sent_at` / `delivered_at` / `failed_at` stamps.
//! A message opened before the worker reached it stays in the delivery queue.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Delivery status of a queued email.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    /// Waiting for the delivery worker.
    Pending,
    /// Accepted by the relay.
    Sent,
    /// Assumed delivered after a successful submit.
    Delivered,
    /// Opened by the recipient (tracking pixel fetched).
    Read,
    /// Rejected by validation or by the relay. Never retried.
    Failed,
}

impl EmailStatus {
    pub const ALL: [Self; 5] =
        [Self::Pending, Self::Sent, Self::Delivered, Self::Read, Self::Failed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    /// No further worker-driven transition happens from a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::InvalidStatus(s.to_owned())),
        }
    }
}

/// A row of the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    /// HTML body including the tracking `<img>` appended at enqueue time.
    pub body_html: String,
    pub status: EmailStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    /// Set together with `Failed`; meaningless under any other status.
    pub last_error: Option<String>,
    /// Opaque, globally unique, immutable after creation.
    pub tracking_token: String,
    /// Reserved for relay integrations that return a message id.
    pub provider_message_id: Option<String>,
}

impl EmailMessage {
    /// Applies `transition` if the state machine allows it.
    ///
    /// Timestamps are write-once: a stamp that is already set is never moved.
    /// Returns `false` (and leaves the message untouched) when the transition
    /// is not allowed from the current state.
    pub fn apply(&mut self, transition: &StatusTransition, at: DateTime<Utc>) -> bool {
        if !transition.allowed_from(self) {
            return false;
        }
        match transition {
            StatusTransition::Sent => {
                self.sent_at.get_or_insert(at);
                if self.status != EmailStatus::Read {
                    self.status = EmailStatus::Sent;
                }
            },
            StatusTransition::Delivered => {
                self.delivered_at.get_or_insert(at);
                if self.status != EmailStatus::Read {
                    self.status = EmailStatus::Delivered;
                }
            },
            StatusTransition::Failed { error } => {
                self.failed_at.get_or_insert(at);
                self.last_error = Some(error.clone());
                if self.status != EmailStatus::Read {
                    self.status = EmailStatus::Failed;
                }
            },
            StatusTransition::Read => {
                self.read_at.get_or_insert(at);
                self.status = EmailStatus::Read;
            },
        }
        true
    }

    /// Whether the worker still has to validate and submit this message.
    ///
    /// True for `Pending`, and for a `Read` message whose delivery outcome has
    /// not been recorded yet.
    #[must_use]
    pub fn awaiting_delivery(&self) -> bool {
        match self.status {
            EmailStatus::Pending => true,
            EmailStatus::Read => self.sent_at.is_none() && self.failed_at.is_none(),
            EmailStatus::Sent | EmailStatus::Delivered | EmailStatus::Failed => false,
        }
    }
}

/// A status change requested by the worker or the tracking endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// Relay accepted the message.
    Sent,
    /// Auto-advance after a successful submit.
    Delivered,
    /// Validation or submission failed; `error` becomes `last_error`.
    Failed { error: String },
    /// Tracking pixel fetched. First open wins.
    Read,
}

impl StatusTransition {
    /// Whether the transition may be applied to `message` in its current state.
    #[must_use]
    pub fn allowed_from(&self, message: &EmailMessage) -> bool {
        let status = message.status;
        match self {
            Self::Sent | Self::Failed { .. } => message.awaiting_delivery(),
            Self::Delivered => {
                status == EmailStatus::Sent
                    || (status == EmailStatus::Read
                        && message.sent_at.is_some()
                        && message.delivered_at.is_none())
            },
            Self::Read => status != EmailStatus::Read,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed { .. } => "failed",
            Self::Read => "read",
        }
    }
}

/// Input for inserting a new `Pending` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
    pub tracking_token: String,
}

impl NewEmailMessage {
    /// Materializes the row a store would insert with the given id and creation time.
    #[must_use]
    pub fn into_message(self, id: i64, created_at: DateTime<Utc>) -> EmailMessage {
        EmailMessage {
            id,
            recipient: self.recipient,
            subject: self.subject,
            body_html: self.body_html,
            status: EmailStatus::Pending,
            created_at,
            sent_at: None,
            delivered_at: None,
            read_at: None,
            failed_at: None,
            last_error: None,
            tracking_token: self.tracking_token,
            provider_message_id: None,
        }
    }
}

/// Message counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: u64,
    pub sent: u64,
    pub delivered: u64,
    pub read: u64,
    pub failed: u64,
}

impl QueueStats {
    pub fn record(&mut self, status: EmailStatus, count: u64) {
        let slot = match status {
            EmailStatus::Pending => &mut self.pending,
            EmailStatus::Sent => &mut self.sent,
            EmailStatus::Delivered => &mut self.delivered,
            EmailStatus::Read => &mut self.read,
            EmailStatus::Failed => &mut self.failed,
        };
        *slot = slot.saturating_add(count);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending
            .saturating_add(self.sent)
            .saturating_add(self.delivered)
            .saturating_add(self.read)
            .saturating_add(self.failed)
    }
}
