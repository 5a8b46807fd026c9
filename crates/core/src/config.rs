//! Runtime configuration loaded from `PIXELPOST_*` environment variables.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    env_flag_with_default, env_parse_with_default, env_required, env_string, CoreError,
    DEFAULT_DISPOSABLE_DOMAINS, DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_FROM_NAME,
    DEFAULT_IDLE_INTERVAL_MS, DEFAULT_INTER_SEND_DELAY_MS, DEFAULT_ITERATION_DELAY_MS,
    DEFAULT_LOG_DIR, DEFAULT_PUBLIC_URL, DEFAULT_SMTP_PORT, DEFAULT_SMTP_TIMEOUT_SECS,
};

/// SMTP relay settings shared by delivery and admin alerts.
#[derive(Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Upgrade the connection with STARTTLS.
    pub enable_ssl: bool,
    pub user: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    /// Alert recipient; falls back to `from_address`.
    pub admin_address: Option<String>,
    /// Advance `Sent` to `Delivered` right after a successful submit.
    pub assume_delivered_on_send: bool,
    pub timeout: Duration,
}

impl RelayConfig {
    /// # Errors
    /// Fails when `PIXELPOST_SMTP_HOST` or `PIXELPOST_SMTP_FROM` is missing.
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            host: env_required("PIXELPOST_SMTP_HOST")?,
            port: env_parse_with_default("PIXELPOST_SMTP_PORT", DEFAULT_SMTP_PORT),
            enable_ssl: env_flag_with_default("PIXELPOST_SMTP_ENABLE_SSL", true),
            user: env_string("PIXELPOST_SMTP_USER").unwrap_or_default(),
            password: std::env::var("PIXELPOST_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env_required("PIXELPOST_SMTP_FROM")?,
            from_name: env_string("PIXELPOST_SMTP_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_owned()),
            admin_address: env_string("PIXELPOST_ADMIN_ADDRESS"),
            assume_delivered_on_send: env_flag_with_default(
                "PIXELPOST_ASSUME_DELIVERED_ON_SEND",
                false,
            ),
            timeout: Duration::from_secs(env_parse_with_default(
                "PIXELPOST_SMTP_TIMEOUT_SECS",
                DEFAULT_SMTP_TIMEOUT_SECS,
            )),
        })
    }

    #[must_use]
    pub fn admin_address(&self) -> &str {
        self.admin_address.as_deref().unwrap_or(&self.from_address)
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("enable_ssl", &self.enable_ssl)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("admin_address", &self.admin_address)
            .field("assume_delivered_on_send", &self.assume_delivered_on_send)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Application-level settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL the tracking pixel links point at, without trailing slash.
    pub public_base_url: String,
}

impl AppConfig {
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let url: String = public_base_url.into();
        Self { public_base_url: url.trim_end_matches('/').to_owned() }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            env_string("PIXELPOST_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_owned()),
        )
    }
}

/// Immutable, case-insensitive deny-list of disposable mail domains.
#[derive(Debug, Clone)]
pub struct DisposableDomains(Arc<HashSet<String>>);

impl DisposableDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self(Arc::new(set))
    }

    /// Reads a comma-separated override from `PIXELPOST_DISPOSABLE_DOMAINS`.
    #[must_use]
    pub fn from_env() -> Self {
        match env_string("PIXELPOST_DISPOSABLE_DOMAINS") {
            Some(list) => Self::new(list.split(',')),
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains(&domain.trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DisposableDomains {
    fn default() -> Self {
        Self::new(DEFAULT_DISPOSABLE_DOMAINS.iter().copied())
    }
}

/// Delivery worker pacing and the event log location.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub idle_interval: Duration,
    pub inter_send_delay: Duration,
    pub iteration_delay: Duration,
    pub log_dir: PathBuf,
    pub disposable_domains: DisposableDomains,
    pub dns_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_millis(DEFAULT_IDLE_INTERVAL_MS),
            inter_send_delay: Duration::from_millis(DEFAULT_INTER_SEND_DELAY_MS),
            iteration_delay: Duration::from_millis(DEFAULT_ITERATION_DELAY_MS),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            disposable_domains: DisposableDomains::default(),
            dns_timeout: Duration::from_secs(DEFAULT_DNS_TIMEOUT_SECS),
        }
    }
}

impl WorkerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            idle_interval: Duration::from_millis(env_parse_with_default(
                "PIXELPOST_IDLE_INTERVAL_MS",
                DEFAULT_IDLE_INTERVAL_MS,
            )),
            inter_send_delay: Duration::from_millis(env_parse_with_default(
                "PIXELPOST_INTER_SEND_DELAY_MS",
                DEFAULT_INTER_SEND_DELAY_MS,
            )),
            iteration_delay: Duration::from_millis(env_parse_with_default(
                "PIXELPOST_ITERATION_DELAY_MS",
                DEFAULT_ITERATION_DELAY_MS,
            )),
            log_dir: env_string("PIXELPOST_LOG_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from),
            disposable_domains: DisposableDomains::from_env(),
            dns_timeout: Duration::from_secs(env_parse_with_default(
                "PIXELPOST_DNS_TIMEOUT_SECS",
                DEFAULT_DNS_TIMEOUT_SECS,
            )),
        }
    }
}
