use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered tenant. `target_url` of `None` means payloads are logged only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub target_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
