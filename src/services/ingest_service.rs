use bytes::Bytes;

use crate::error::{Error, Result};
use crate::services::{
    project_service::ProjectService,
    relay_queue::{RelayJob, RelayQueue},
    webhook_log_service::WebhookLogService,
};

/// What the caller learns about an accepted webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub entry_id: i64,
    /// A forward was queued. Says nothing about whether it will succeed.
    pub relay_queued: bool,
}

#[derive(Clone)]
pub struct IngestService {
    projects: ProjectService,
    log: WebhookLogService,
    relay: RelayQueue,
}

impl IngestService {
    pub fn new(projects: ProjectService, log: WebhookLogService, relay: RelayQueue) -> Self {
        Self {
            projects,
            log,
            relay,
        }
    }

    /// Logs `payload` for a known project, then queues a single forward to
    /// the project's current target if it has one.
    ///
    /// Unknown projects are rejected before anything is written.
    pub async fn receive(&self, project_id: &str, payload: Bytes) -> Result<Receipt> {
        let project = self
            .projects
            .find(project_id)
            .await?
            .ok_or_else(|| Error::NotFound("Project not found.".into()))?;

        let entry = self.log.append(project_id, &payload).await?;

        let relay_queued = match project.target_url {
            Some(target_url) => {
                self.relay.submit(RelayJob {
                    project_id: project.id,
                    entry_id: entry.id,
                    target_url,
                    payload,
                });
                true
            }
            None => false,
        };

        tracing::info!(
            project_id = %project_id,
            entry_id = entry.id,
            relay_queued,
            "Received webhook"
        );

        Ok(Receipt {
            entry_id: entry.id,
            relay_queued,
        })
    }
}
