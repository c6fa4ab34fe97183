use std::sync::Arc;

use crate::config::Config;
use crate::database::{PgStore, SqliteStore, WebhookStore};
use crate::error::{Error, Result};

/// Opens the store named by `database_url` and applies its migrations.
pub async fn connect(config: &Config) -> Result<Arc<dyn WebhookStore>> {
    let url = config.database_url.as_str();
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        tracing::info!("Using PostgreSQL storage");
        let store = PgStore::connect(url, config.db_max_connections).await?;
        Ok(Arc::new(store))
    } else if url.starts_with("sqlite:") {
        tracing::info!("Using SQLite storage at {}", url);
        let store = SqliteStore::connect(url, config.db_max_connections).await?;
        Ok(Arc::new(store))
    } else {
        Err(Error::Config(format!(
            "Unsupported DATABASE_URL scheme: {}",
            url.split(':').next().unwrap_or_default()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let config = Config {
            database_url: "mysql://localhost/hooks".to_string(),
            ..Config::default()
        };
        let err = connect(&config).await.err().expect("scheme must be rejected");
        assert!(matches!(err, Error::Config(msg) if msg.contains("mysql")));
    }

    #[tokio::test]
    async fn sqlite_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("hook-relay-{}.db", uuid::Uuid::new_v4()));
        let config = Config {
            database_url: format!("sqlite://{}", path.display()),
            ..Config::default()
        };

        {
            let store = connect(&config).await.unwrap();
            assert!(store.insert_project("p1").await.unwrap());
            store.append_entry("p1", b"durable").await.unwrap();
        }

        let reopened = connect(&config).await.unwrap();
        assert!(reopened.get_project("p1").await.unwrap().is_some());
        let entries = reopened.list_entries("p1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload, b"durable".to_vec());

        drop(reopened);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
