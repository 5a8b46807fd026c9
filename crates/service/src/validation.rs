//! Ordered, short-circuiting recipient checks run before every submit.
//!
//! 1. address shape
//! 2. disposable-domain deny-list
//! 3. MX reachability (lookup failure counts as unreachable)

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::ResolverOpts, name_server::TokioConnectionProvider, TokioResolver,
};
use pixelpost_core::DisposableDomains;
use regex::Regex;
use thiserror::Error;

static EMAIL_SHAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Permanent recipient rejection. `Display` is the stored failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format.")]
    Format,

    #[error("Disposable email domains are not allowed.")]
    DisposableDomain,

    #[error("Domain has no MX records (cannot receive email).")]
    NoMxRecord,
}

#[derive(Debug, Error)]
#[error("MX lookup failed: {0}")]
pub struct MxLookupError(pub String);

impl From<hickory_resolver::ResolveError> for MxLookupError {
    fn from(err: hickory_resolver::ResolveError) -> Self {
        Self(err.to_string())
    }
}

/// Resolves the mail exchangers of a domain.
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn mx_hosts(&self, domain: &str) -> Result<Vec<String>, MxLookupError>;
}

/// System-resolver backed [`MxLookup`].
pub struct HickoryMxLookup {
    resolver: TokioResolver,
}

impl HickoryMxLookup {
    /// Reads the system DNS configuration.
    pub fn new(timeout: Duration) -> Result<Self, MxLookupError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        let resolver =
            TokioResolver::builder(TokioConnectionProvider::default())?.with_options(opts).build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl MxLookup for HickoryMxLookup {
    async fn mx_hosts(&self, domain: &str) -> Result<Vec<String>, MxLookupError> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => Ok(lookup.iter().map(|mx| mx.exchange().to_utf8()).collect()),
            Err(err) if err.is_no_records_found() => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Validation pipeline with an injected deny-list and resolver.
#[derive(Clone)]
pub struct ValidationPipeline {
    disposable: DisposableDomains,
    mx: Arc<dyn MxLookup>,
}

impl ValidationPipeline {
    #[must_use]
    pub fn new(disposable: DisposableDomains, mx: Arc<dyn MxLookup>) -> Self {
        Self { disposable, mx }
    }

    /// Runs the checks in order and stops at the first failure.
    pub async fn validate(&self, recipient: &str) -> Result<(), ValidationError> {
        if !is_valid_format(recipient) {
            return Err(ValidationError::Format);
        }
        let domain = recipient_domain(recipient).ok_or(ValidationError::Format)?;
        if self.disposable.contains(domain) {
            return Err(ValidationError::DisposableDomain);
        }
        match self.mx.mx_hosts(domain).await {
            Ok(hosts) if !hosts.is_empty() => Ok(()),
            Ok(_) => {
                tracing::debug!(domain, "no MX records");
                Err(ValidationError::NoMxRecord)
            },
            Err(err) => {
                tracing::debug!(domain, error = %err, "MX lookup failed, treating as unreachable");
                Err(ValidationError::NoMxRecord)
            },
        }
    }
}

#[must_use]
pub fn is_valid_format(recipient: &str) -> bool {
    EMAIL_SHAPE_REGEX.is_match(recipient)
}

/// Text after the last `@`.
#[must_use]
pub fn recipient_domain(recipient: &str) -> Option<&str> {
    recipient.rsplit_once('@').map(|(_, domain)| domain).filter(|d| !d.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;
    use crate::test_support::StaticMxLookup;

    fn pipeline(mx: StaticMxLookup) -> ValidationPipeline {
        ValidationPipeline::new(DisposableDomains::default(), Arc::new(mx))
    }

    #[test]
    fn format_accepts_common_shapes() {
        assert!(is_valid_format("alice@example.com"));
        assert!(is_valid_format("ALICE+tag@Mail.Example.CO.UK"));
        assert!(!is_valid_format("alice@localhost"));
        assert!(!is_valid_format("alice example@example.com"));
        assert!(!is_valid_format("@example.com"));
        assert!(!is_valid_format("alice@@example.com"));
    }

    #[test]
    fn domain_is_after_last_at() {
        assert_eq!(recipient_domain("a@b.com"), Some("b.com"));
        assert_eq!(recipient_domain("nope"), None);
    }

    #[tokio::test]
    async fn format_is_checked_before_disposable_domain() {
        let mx = StaticMxLookup::with_hosts(&["mx.example.com"]);
        let err = pipeline(mx.clone()).validate("bad address@mailinator.com").await.unwrap_err();
        assert_eq!(err, ValidationError::Format);
        assert_eq!(mx.calls(), 0);
    }

    #[tokio::test]
    async fn disposable_domain_short_circuits_dns() {
        let mx = StaticMxLookup::with_hosts(&["mx.example.com"]);
        let err = pipeline(mx.clone()).validate("bob@MAILINATOR.com").await.unwrap_err();
        assert_eq!(err, ValidationError::DisposableDomain);
        assert_eq!(err.to_string(), "Disposable email domains are not allowed.");
        assert_eq!(mx.calls(), 0);
    }

    #[tokio::test]
    async fn zero_mx_records_and_lookup_errors_both_fail() {
        let empty = pipeline(StaticMxLookup::with_hosts(&[]));
        assert_eq!(empty.validate("a@nomx.test").await, Err(ValidationError::NoMxRecord));

        let broken = pipeline(StaticMxLookup::failing());
        let err = broken.validate("a@broken.test").await.unwrap_err();
        assert_eq!(err.to_string(), "Domain has no MX records (cannot receive email).");
    }

    #[tokio::test]
    async fn passes_with_mx_records() {
        let mx = StaticMxLookup::with_hosts(&["mx1.example.com"]);
        assert!(pipeline(mx.clone()).validate("alice@example.com").await.is_ok());
        assert_eq!(mx.calls(), 1);
    }
}
