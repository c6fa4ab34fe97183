use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored inbound payload. Entries are immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WebhookEntry {
    pub id: i64,
    pub project_id: String,
    pub payload: Vec<u8>,
    pub received_at: DateTime<Utc>,
}
