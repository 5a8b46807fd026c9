use std::sync::Arc;

use pixelpost_core::{
    AppConfig, EmailMessage, NewEmailMessage, MAX_BODY_LEN, MAX_SUBJECT_LEN,
    TRACKING_PATH_PREFIX,
};
use pixelpost_storage::{EmailStore, StorageBackend};
use uuid::Uuid;

use crate::templates::tracking_pixel_tag;
use crate::ServiceError;

/// Creates `Pending` messages with an embedded tracking pixel.
///
/// Never talks to SMTP or DNS; delivery happens in the worker.
pub struct EnqueueService {
    storage: Arc<StorageBackend>,
    app: AppConfig,
}

impl EnqueueService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, app: AppConfig) -> Self {
        Self { storage, app }
    }

    #[must_use]
    pub fn pixel_url(&self, token: &str) -> String {
        format!("{}{TRACKING_PATH_PREFIX}{token}", self.app.public_base_url)
    }

    pub async fn enqueue(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<EmailMessage, ServiceError> {
        let token = Uuid::new_v4().simple().to_string();
        let body_with_pixel = format!("{body_html}{}", tracking_pixel_tag(&self.pixel_url(&token)));
        let message = self
            .storage
            .insert_message(NewEmailMessage {
                recipient: recipient.to_owned(),
                subject: subject.to_owned(),
                body_html: body_with_pixel,
                tracking_token: token,
            })
            .await?;
        tracing::info!(
            id = message.id,
            "Queued email to {} (token {})",
            message.recipient,
            message.tracking_token
        );
        Ok(message)
    }

    /// Bounds checks for the compose surfaces (HTTP and CLI), then enqueue.
    pub async fn compose(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<EmailMessage, ServiceError> {
        check_compose_input(recipient, subject, body_html)?;
        self.enqueue(recipient.trim(), subject, body_html).await
    }
}

pub fn check_compose_input(
    recipient: &str,
    subject: &str,
    body_html: &str,
) -> Result<(), ServiceError> {
    if recipient.trim().is_empty() {
        return Err(ServiceError::InvalidInput("recipient is required".to_owned()));
    }
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "subject exceeds {MAX_SUBJECT_LEN} characters"
        )));
    }
    if body_html.chars().count() > MAX_BODY_LEN {
        return Err(ServiceError::InvalidInput(format!("body exceeds {MAX_BODY_LEN} characters")));
    }
    Ok(())
}
