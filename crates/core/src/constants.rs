//! Shared constants for pixelpost.
//!
//! Defaults for every tunable live here so the config layer and the tests agree.

/// Route prefix of the open-tracking endpoint (`{public_url}/t/{token}`).
pub const TRACKING_PATH_PREFIX: &str = "/t/";

/// 1x1 transparent GIF89a returned for every tracking hit.
pub const TRACKING_PIXEL_GIF: [u8; 43] = [
    71, 73, 70, 56, 57, 97, 1, 0, 1, 0, 128, 0, 0, 255, 255, 255, 0, 0, 0, 33, 249, 4, 1, 0, 0,
    1, 0, 44, 0, 0, 0, 0, 1, 0, 1, 0, 0, 2, 2, 68, 1, 0, 59,
];

/// Content type of [`TRACKING_PIXEL_GIF`].
pub const TRACKING_PIXEL_CONTENT_TYPE: &str = "image/gif";

/// Sleep when the queue has no pending message.
pub const DEFAULT_IDLE_INTERVAL_MS: u64 = 5_000;

/// Pause after each successful submit, for relay rate limits.
pub const DEFAULT_INTER_SEND_DELAY_MS: u64 = 500;

/// Pause between worker iterations.
pub const DEFAULT_ITERATION_DELAY_MS: u64 = 2_000;

/// Directory receiving the daily `log-YYYY-MM-DD.txt` event files.
pub const DEFAULT_LOG_DIR: &str = "Logs";

/// Default relay submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Relay socket timeout in seconds.
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

/// MX lookup timeout in seconds.
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

/// Display name used when `PIXELPOST_SMTP_FROM_NAME` is unset.
pub const DEFAULT_FROM_NAME: &str = "pixelpost";

/// Public base URL used to build pixel links when none is configured.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

/// Known throwaway-mail providers rejected by the validation pipeline.
pub const DEFAULT_DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "tempmail.com",
    "10minutemail.com",
    "guerrillamail.com",
    "yopmail.com",
];

/// Maximum subject length accepted by the compose surfaces.
pub const MAX_SUBJECT_LEN: usize = 200;

/// Maximum body length accepted by the compose surfaces.
pub const MAX_BODY_LEN: usize = 4000;

/// Maximum rows returned by list queries.
pub const MAX_LIST_LIMIT: usize = 500;

/// Rows returned by list queries when the caller gives no limit.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;
