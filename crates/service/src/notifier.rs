use std::sync::Arc;

use crate::event_log::EventLog;
use crate::relay::{OutboundEmail, Relay};
use crate::templates::{admin_alert_html, ADMIN_ALERT_SUBJECT};

/// Best-effort failure alert sent through the delivery relay.
///
/// Errors are logged and swallowed; an alert never touches message state.
#[derive(Clone)]
pub struct AdminNotifier {
    relay: Arc<dyn Relay>,
    admin_address: String,
    events: EventLog,
}

impl AdminNotifier {
    #[must_use]
    pub fn new(relay: Arc<dyn Relay>, admin_address: impl Into<String>, events: EventLog) -> Self {
        Self { relay, admin_address: admin_address.into(), events }
    }

    #[must_use]
    pub fn admin_address(&self) -> &str {
        &self.admin_address
    }

    /// Returns whether the relay accepted the alert.
    pub async fn notify(&self, failed_recipient: &str, reason: &str) -> bool {
        let alert = OutboundEmail {
            to: self.admin_address.clone(),
            subject: ADMIN_ALERT_SUBJECT.to_owned(),
            html_body: admin_alert_html(failed_recipient, reason),
        };
        match self.relay.submit(&alert).await {
            Ok(()) => {
                self.events.info(&format!("Admin notified about failed email: {failed_recipient}")).await;
                true
            },
            Err(e) => {
                tracing::warn!(admin = %self.admin_address, error = %e, "admin alert rejected");
                self.events
                    .error(&format!("Failed to notify admin about email: {failed_recipient}"))
                    .await;
                false
            },
        }
    }
}
