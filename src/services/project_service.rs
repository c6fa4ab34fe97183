use std::sync::Arc;

use crate::database::WebhookStore;
use crate::error::{Error, Result};
use crate::models::project::Project;

/// The project directory: registration and forwarding targets.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn WebhookStore>,
    validate_target_urls: bool,
}

impl ProjectService {
    pub fn new(store: Arc<dyn WebhookStore>) -> Self {
        Self {
            store,
            validate_target_urls: false,
        }
    }

    /// Reject targets that are not absolute `http`/`https` URLs.
    pub fn with_target_validation(mut self, enabled: bool) -> Self {
        self.validate_target_urls = enabled;
        self
    }

    pub async fn register(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::BadRequest("Project id must not be empty.".into()));
        }
        if !self.store.insert_project(id).await? {
            return Err(Error::AlreadyExists("Project already exists.".into()));
        }
        tracing::info!(project_id = %id, "Registered project");
        Ok(())
    }

    pub async fn set_target(&self, id: &str, target_url: &str) -> Result<()> {
        if target_url.is_empty() {
            return Err(Error::BadRequest("Target URL must not be empty.".into()));
        }
        if self.validate_target_urls {
            check_target_url(target_url)?;
        }
        if !self.store.update_target(id, target_url).await? {
            return Err(Error::NotFound("Project not found.".into()));
        }
        tracing::info!(project_id = %id, target = %target_url, "Updated project target");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Project> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Project not found.".into()))
    }

    pub async fn find(&self, id: &str) -> Result<Option<Project>> {
        self.store.get_project(id).await
    }
}

fn check_target_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::BadRequest(format!("Invalid target URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        "http" | "https" => Err(Error::BadRequest("Target URL has no host.".into())),
        other => Err(Error::BadRequest(format!(
            "Unsupported target URL scheme: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockWebhookStore;
    use chrono::Utc;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn duplicate_registration_is_already_exists() {
        let mut store = MockWebhookStore::new();
        store
            .expect_insert_project()
            .with(eq("p1"))
            .times(1)
            .returning(|_| Ok(false));

        let service = ProjectService::new(Arc::new(store));
        let err = service.register("p1").await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn set_target_on_unknown_project_is_not_found() {
        let mut store = MockWebhookStore::new();
        store.expect_update_target().returning(|_, _| Ok(false));

        let service = ProjectService::new(Arc::new(store));
        let err = service.set_target("ghost", "http://example/x").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn targets_are_not_validated_by_default() {
        let mut store = MockWebhookStore::new();
        store
            .expect_update_target()
            .with(eq("p1"), eq("not a url"))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = ProjectService::new(Arc::new(store));
        tokio_test::assert_ok!(service.set_target("p1", "not a url").await);
    }

    #[tokio::test]
    async fn opt_in_validation_rejects_before_touching_the_store() {
        let mut store = MockWebhookStore::new();
        store.expect_update_target().times(0);

        let service = ProjectService::new(Arc::new(store)).with_target_validation(true);
        for bad in ["not a url", "ftp://example.com/x", "http:/"] {
            let err = service.set_target("p1", bad).await.unwrap_err();
            assert!(matches!(err, Error::BadRequest(_)), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn opt_in_validation_accepts_http_targets() {
        let mut store = MockWebhookStore::new();
        store.expect_update_target().times(1).returning(|_, _| Ok(true));

        let service = ProjectService::new(Arc::new(store)).with_target_validation(true);
        tokio_test::assert_ok!(service.set_target("p1", "https://example.com/hooks").await);
    }

    #[tokio::test]
    async fn get_returns_current_target() {
        let mut store = MockWebhookStore::new();
        store.expect_get_project().returning(|id| {
            Ok(Some(Project {
                id: id.to_string(),
                target_url: Some("http://example/x".into()),
                created_at: Utc::now(),
            }))
        });

        let service = ProjectService::new(Arc::new(store));
        let project = service.get("p1").await.unwrap();
        assert_eq!(project.target_url.as_deref(), Some("http://example/x"));
    }
}
