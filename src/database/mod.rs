//! Storage behind the project directory and the webhook log.
//!
//! Every component receives the store as an `Arc<dyn WebhookStore>` at
//! construction. Each method is atomic on its own; no cross-method
//! transaction is offered or needed.

pub mod pool;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{project::Project, webhook_log::WebhookEntry};

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Inserts a project with no target. Returns `false` if the id is taken.
    async fn insert_project(&self, id: &str) -> Result<bool>;

    /// Overwrites the target of an existing project. Returns `false` if the id is unknown.
    async fn update_target(&self, id: &str, target_url: &str) -> Result<bool>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// Appends a payload and returns the stored entry with its assigned id.
    ///
    /// Ids come from the engine's auto-increment and are strictly increasing
    /// across the whole log. The project is not checked here.
    async fn append_entry(&self, project_id: &str, payload: &[u8]) -> Result<WebhookEntry>;

    /// All entries of a project in append order. Unknown projects yield an empty list.
    async fn list_entries(&self, project_id: &str) -> Result<Vec<WebhookEntry>>;
}
