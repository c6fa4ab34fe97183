use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::database::WebhookStore;
use crate::error::Result;
use crate::models::{project::Project, webhook_log::WebhookEntry};

/// SQLite-backed store. The default backend.
///
/// File databases run in WAL mode with `synchronous = FULL`, so an append
/// has reached disk by the time it returns.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. Not durable; used by tests.
    pub async fn new_in_memory() -> Result<Self> {
        // Every connection to `:memory:` is its own database, so pin exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl WebhookStore for SqliteStore {
    async fn insert_project(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (id, target_url, created_at)
            VALUES (?1, NULL, ?2)
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
        let result = sqlx::query("UPDATE projects SET target_url = ?1 WHERE id = ?2")
            .bind(target_url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        // Drained with fetch_all so the read snapshot is released before returning.
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, target_url, created_at FROM projects WHERE id = ?1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .pop();
        Ok(project)
    }

    async fn append_entry(&self, project_id: &str, payload: &[u8]) -> Result<WebhookEntry> {
        let entry = sqlx::query_as::<_, WebhookEntry>(
            r#"
            INSERT INTO webhook_logs (project_id, payload, received_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, project_id, payload, received_at
            "#,
        )
        .bind(project_id)
        .bind(payload)
        .bind(Utc::now())
        // The autocommit only completes once the statement is stepped to the
        // end, which fetch_one does not do.
        .fetch_all(&self.pool)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
        Ok(entry)
    }

    async fn list_entries(&self, project_id: &str) -> Result<Vec<WebhookEntry>> {
        let entries = sqlx::query_as::<_, WebhookEntry>(
            r#"
            SELECT id, project_id, payload, received_at
            FROM webhook_logs
            WHERE project_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> SqliteStore {
        SqliteStore::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn insert_project_is_insert_if_absent() {
        let store = setup_test_store().await;
        assert!(store.insert_project("p1").await.unwrap());
        assert!(!store.insert_project("p1").await.unwrap());

        let project = store.get_project("p1").await.unwrap().unwrap();
        assert_eq!(project.id, "p1");
        assert_eq!(project.target_url, None);
    }

    #[tokio::test]
    async fn update_target_reports_missing_rows() {
        let store = setup_test_store().await;
        assert!(!store.update_target("nope", "http://x").await.unwrap());

        store.insert_project("p1").await.unwrap();
        assert!(store.update_target("p1", "http://a").await.unwrap());
        assert!(store.update_target("p1", "http://a").await.unwrap());
        let project = store.get_project("p1").await.unwrap().unwrap();
        assert_eq!(project.target_url.as_deref(), Some("http://a"));
    }

    #[tokio::test]
    async fn entries_keep_bytes_and_order() {
        let store = setup_test_store().await;
        let raw = vec![0xff, 0x00, 0xfe, b'x'];
        let first = store.append_entry("p1", &raw).await.unwrap();
        let other = store.append_entry("p2", b"other").await.unwrap();
        let second = store.append_entry("p1", b"second").await.unwrap();

        assert!(first.id < other.id && other.id < second.id);

        let entries = store.list_entries("p1").await.unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(entries[0].payload, raw);
        assert_eq!(entries[1].payload, b"second".to_vec());
    }

    struct TempDb(std::path::PathBuf);

    impl TempDb {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("hook-relay-{}.db", uuid::Uuid::new_v4())))
        }

        fn url(&self) -> String {
            format!("sqlite://{}", self.0.display())
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", self.0.display(), suffix));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn appended_entry_is_visible_on_other_connections_at_once() {
        let db = TempDb::new();
        let store = SqliteStore::connect(&db.url(), 8).await.unwrap();

        for i in 0..200usize {
            let project = format!("p{}", i % 4);
            let entry = store.append_entry(&project, b"hello").await.unwrap();
            // A concurrent reader keeps other pooled connections busy.
            let reader = store.clone();
            let side = tokio::spawn(async move { reader.list_entries("p0").await });

            let entries = store.list_entries(&project).await.unwrap();
            assert_eq!(entries.last().map(|e| e.id), Some(entry.id), "iteration {i}");
            side.await.unwrap().unwrap();

            assert!(store.get_project(&project).await.unwrap().is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_all_committed_on_return() {
        let db = TempDb::new();
        let store = SqliteStore::connect(&db.url(), 8).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append_entry("p1", format!("n{}", i).as_bytes()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = store.list_entries("p1").await.unwrap();
        assert_eq!(entries.len(), 100);
        assert!(entries.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn unknown_project_has_empty_log() {
        let store = setup_test_store().await;
        assert!(store.list_entries("ghost").await.unwrap().is_empty());
    }
}
