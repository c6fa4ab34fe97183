use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::{
    forwarder::Forwarder, project_service::ProjectService,
    webhook_log_service::WebhookLogService,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Entries a delivery was attempted for.
    pub attempted: usize,
    /// Entries the target acknowledged with a 2xx status.
    pub delivered: usize,
    /// The replay was stopped before the end of the log.
    pub cancelled: bool,
}

/// Re-sends a project's stored log to its current target.
#[derive(Clone)]
pub struct ReplayService {
    projects: ProjectService,
    log: WebhookLogService,
    forwarder: Forwarder,
}

impl ReplayService {
    pub fn new(projects: ProjectService, log: WebhookLogService, forwarder: Forwarder) -> Self {
        Self {
            projects,
            log,
            forwarder,
        }
    }

    /// Delivers every entry of the project, oldest first, one at a time.
    ///
    /// The target is read once up front; a later target change does not
    /// affect this replay. Failed deliveries are counted and skipped.
    /// Cancelling `cancel` stops before the next entry, or abandons the one
    /// in flight.
    pub async fn replay(&self, project_id: &str, cancel: &CancellationToken) -> Result<ReplayReport> {
        let target_url = self
            .projects
            .find(project_id)
            .await?
            .and_then(|project| project.target_url)
            .ok_or_else(|| Error::NotFound("Project or target not found.".into()))?;

        let entries = self.log.list(project_id).await?;
        let replay_id = Uuid::new_v4();
        tracing::info!(
            %replay_id,
            project_id = %project_id,
            target = %target_url,
            entries = entries.len(),
            "Starting replay"
        );

        let mut report = ReplayReport::default();
        for entry in entries {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            report.attempted += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                result = self.forwarder.deliver(&target_url, Bytes::from(entry.payload)) => result,
            };

            if result.is_success() {
                report.delivered += 1;
            } else {
                tracing::debug!(
                    %replay_id,
                    entry_id = entry.id,
                    status = ?result.status_code(),
                    "Replay delivery failed"
                );
            }
        }

        tracing::info!(
            %replay_id,
            project_id = %project_id,
            attempted = report.attempted,
            delivered = report.delivered,
            cancelled = report.cancelled,
            "Finished replay"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MockWebhookStore, WebhookStore};
    use crate::models::{project::Project, webhook_log::WebhookEntry};
    use axum::{http::StatusCode, routing::post, Router};
    use chrono::Utc;
    use tokio::net::TcpListener;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(store: MockWebhookStore) -> ReplayService {
        let store: Arc<dyn WebhookStore> = Arc::new(store);
        ReplayService::new(
            ProjectService::new(store.clone()),
            WebhookLogService::new(store),
            Forwarder::new(Duration::from_secs(1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn missing_project_or_target_is_not_found() {
        let mut store = MockWebhookStore::new();
        store.expect_get_project().returning(|id| {
            Ok(id.eq("p2").then(|| Project {
                id: "p2".into(),
                target_url: None,
                created_at: Utc::now(),
            }))
        });
        store.expect_list_entries().times(0);
        let service = service(store);
        let cancel = CancellationToken::new();

        for id in ["ghost", "p2"] {
            let err = service.replay(id, &cancel).await.unwrap_err();
            assert!(matches!(err, Error::NotFound(msg) if msg == "Project or target not found."));
        }
    }

    #[tokio::test]
    async fn empty_log_replays_nothing() {
        let mut store = MockWebhookStore::new();
        store.expect_get_project().returning(|_| {
            Ok(Some(Project {
                id: "p1".into(),
                target_url: Some("http://127.0.0.1:1/x".into()),
                created_at: Utc::now(),
            }))
        });
        store.expect_list_entries().returning(|_| Ok(Vec::new()));

        let report = service(store)
            .replay("p1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report, ReplayReport::default());
    }

    fn store_with_entries(target_url: String, count: i64) -> MockWebhookStore {
        let mut store = MockWebhookStore::new();
        store.expect_get_project().returning(move |id| {
            Ok(Some(Project {
                id: id.to_string(),
                target_url: Some(target_url.clone()),
                created_at: Utc::now(),
            }))
        });
        store.expect_list_entries().returning(move |project_id| {
            Ok((1..=count)
                .map(|id| WebhookEntry {
                    id,
                    project_id: project_id.to_string(),
                    payload: format!("entry-{}", id).into_bytes(),
                    received_at: Utc::now(),
                })
                .collect())
        });
        store
    }

    #[tokio::test]
    async fn cancelled_token_attempts_nothing() {
        let store = store_with_entries("http://127.0.0.1:1/x".into(), 3);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = service(store).replay("p1", &cancel).await.unwrap();
        assert_eq!(
            report,
            ReplayReport {
                attempted: 0,
                delivered: 0,
                cancelled: true
            }
        );
    }

    #[tokio::test]
    async fn cancel_abandons_the_delivery_in_flight() {
        let app = Router::new().route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                StatusCode::OK
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let store = store_with_entries(format!("http://{}/slow", addr), 3);
        let service = service(store);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(Duration::from_secs(5), service.replay("p1", &cancel))
            .await
            .expect("replay should stop promptly")
            .unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.delivered, 0);
        assert!(report.cancelled);
    }
}
