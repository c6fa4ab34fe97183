use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::database::WebhookStore;
use crate::error::Result;
use crate::models::{project::Project, webhook_log::WebhookEntry};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        let store = Self { pool };
        sqlx::migrate!("./migrations/postgres").run(&store.pool).await?;
        Ok(store)
    }
}

#[async_trait]
impl WebhookStore for PgStore {
    async fn insert_project(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (id, target_url, created_at)
            VALUES ($1, NULL, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_target(&self, id: &str, target_url: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE projects SET target_url = $1 WHERE id = $2")
            .bind(target_url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, target_url, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn append_entry(&self, project_id: &str, payload: &[u8]) -> Result<WebhookEntry> {
        let entry = sqlx::query_as::<_, WebhookEntry>(
            r#"
            INSERT INTO webhook_logs (project_id, payload, received_at)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, payload, received_at
            "#,
        )
        .bind(project_id)
        .bind(payload)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn list_entries(&self, project_id: &str) -> Result<Vec<WebhookEntry>> {
        let entries = sqlx::query_as::<_, WebhookEntry>(
            r#"
            SELECT id, project_id, payload, received_at
            FROM webhook_logs
            WHERE project_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
