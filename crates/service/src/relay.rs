//! SMTP relay submission using lettre.
//!
//! A fresh transport is built for every message and dropped when `submit`
//! returns, so the connection is released on every exit path. No pooling.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use pixelpost_core::RelayConfig;
use thiserror::Error;

/// A fully rendered message ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// Sender or recipient is not a valid RFC 5322 address.
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    /// Connection, TLS, authentication or SMTP-level rejection.
    #[error("{0}")]
    Transport(String),
}

/// Submits one message synchronously to the configured relay.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn submit(&self, email: &OutboundEmail) -> Result<(), RelayError>;
}

pub struct SmtpRelay {
    config: RelayConfig,
}

impl SmtpRelay {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutboundEmail) -> Result<Message, RelayError> {
        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            parse_address(&self.config.from_address)?,
        );
        let to = Mailbox::new(None, parse_address(&email.to)?);
        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| RelayError::Build(e.to_string()))
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, RelayError> {
        let mut builder = if self.config.enable_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| RelayError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        };
        builder = builder.port(self.config.port).timeout(Some(self.config.timeout));
        if self.config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Relay for SmtpRelay {
    async fn submit(&self, email: &OutboundEmail) -> Result<(), RelayError> {
        let message = self.build_message(email)?;
        let transport = self.build_transport()?;
        let response =
            transport.send(message).await.map_err(|e| RelayError::Transport(e.to_string()))?;
        tracing::debug!(
            to = %email.to,
            host = %self.config.host,
            code = %response.code(),
            "relay accepted message"
        );
        Ok(())
    }
}

fn parse_address(raw: &str) -> Result<Address, RelayError> {
    raw.trim().parse::<Address>().map_err(|e| RelayError::Address {
        address: raw.to_owned(),
        reason: e.to_string(),
    })
}
