//! Request/query types (Deserialize)

use pixelpost_core::{EmailStatus, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use serde::Deserialize;

const fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<EmailStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl ListQuery {
    /// Cap limit to prevent unbounded queries.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, DEFAULT_LIST_LIMIT);
        assert!(query.status.is_none());

        let query: ListQuery =
            serde_json::from_str(r#"{"status":"failed","limit":100000}"#).unwrap();
        assert_eq!(query.status, Some(EmailStatus::Failed));
        assert_eq!(query.capped_limit(), MAX_LIST_LIMIT);
    }
}
