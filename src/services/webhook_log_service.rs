use std::sync::Arc;

use crate::database::WebhookStore;
use crate::error::Result;
use crate::models::webhook_log::WebhookEntry;

/// Append-only log of received payloads.
#[derive(Clone)]
pub struct WebhookLogService {
    store: Arc<dyn WebhookStore>,
}

impl WebhookLogService {
    pub fn new(store: Arc<dyn WebhookStore>) -> Self {
        Self { store }
    }

    /// Stores `payload` verbatim. A returned entry has been durably written.
    pub async fn append(&self, project_id: &str, payload: &[u8]) -> Result<WebhookEntry> {
        let entry = self.store.append_entry(project_id, payload).await?;
        tracing::debug!(
            project_id = %project_id,
            entry_id = entry.id,
            bytes = payload.len(),
            "Appended webhook entry"
        );
        Ok(entry)
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<WebhookEntry>> {
        self.store.list_entries(project_id).await
    }
}
