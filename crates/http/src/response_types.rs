//! Response types (Serialize)

use pixelpost_core::{EmailMessage, EmailStatus, QueueStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub id: i64,
    pub status: EmailStatus,
    pub tracking_token: String,
}

impl From<&EmailMessage> for EnqueueResponse {
    fn from(message: &EmailMessage) -> Self {
        Self {
            id: message.id,
            status: message.status,
            tracking_token: message.tracking_token.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmailListResponse {
    pub emails: Vec<EmailMessage>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: QueueStats,
    pub total: u64,
}

impl From<QueueStats> for StatsResponse {
    fn from(stats: QueueStats) -> Self {
        Self { total: stats.total(), stats }
    }
}
