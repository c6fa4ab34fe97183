use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::webhook_log::WebhookEntry;
use crate::services::replay_service::ReplayReport;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceiveResponse {
    pub message: String,
    pub entry_id: i64,
}

/// A stored entry as returned by the log listing.
///
/// `payload` is the body as text when it is valid UTF-8 and `null`
/// otherwise. `payload_base64` always holds the exact bytes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookEntryResponse {
    pub id: i64,
    pub payload: Option<String>,
    pub payload_base64: String,
    pub received_at: DateTime<Utc>,
}

impl From<WebhookEntry> for WebhookEntryResponse {
    fn from(entry: WebhookEntry) -> Self {
        let payload_base64 = STANDARD.encode(&entry.payload);
        Self {
            id: entry.id,
            payload: String::from_utf8(entry.payload).ok(),
            payload_base64,
            received_at: entry.received_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplayResponse {
    pub message: String,
    pub attempted: usize,
    pub delivered: usize,
    pub cancelled: bool,
}

impl ReplayResponse {
    pub fn new(report: ReplayReport, reported: usize) -> Self {
        Self {
            message: format!("Replayed {} logs.", reported),
            attempted: report.attempted,
            delivered: report.delivered,
            cancelled: report.cancelled,
        }
    }
}
