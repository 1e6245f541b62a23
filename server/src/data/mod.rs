//! Data storage layer
//!
//! Provides the store services for the application:
//! - `sqlite` - Embedded transactional store (directory + catalog tables)
//! - `types` - Shared row types and enums
//! - `traits` - Repository traits (`DirectoryRepository`, `CatalogRepository`)
//! - `error` - Unified error type
//!
//! The API layer only sees the repository traits; the SQLite backend is the
//! single concrete implementation today.

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::{SqliteRepository, SqliteService};
pub use traits::{CatalogRepository, DirectoryRepository};

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Database service owning the SQLite backend and its repositories
pub struct DatabaseService {
    sqlite: Arc<SqliteService>,
    repository: Arc<SqliteRepository>,
}

impl DatabaseService {
    /// Initialize the store and run migrations
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let sqlite = Arc::new(SqliteService::init(storage).await?);
        let repository = Arc::new(SqliteRepository::new(sqlite.pool().clone()));
        Ok(Self { sqlite, repository })
    }

    /// Directory store handle (users, organizations)
    pub fn directory(&self) -> Arc<dyn DirectoryRepository> {
        self.repository.clone()
    }

    /// Catalog store handle (products, price data, recommendations)
    pub fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.repository.clone()
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.sqlite.pool()
    }

    /// Checkpoint the WAL
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        Ok(self.sqlite.checkpoint().await?)
    }

    /// Close the pool gracefully
    pub async fn close(&self) {
        self.sqlite.close().await;
    }

    /// Spawn the periodic WAL checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sqlite.start_checkpoint_task(shutdown_rx)
    }
}
