//! Persistence for workout summaries.
//!
//! The pipeline only depends on [`WorkoutStore`]; [`Store`] picks a backend
//! from the configured database URL.

mod memory;
mod sqlite;

use std::future::Future;

use crate::error::StoreError;
use crate::types::workout::{StoredWorkout, WorkoutSummary};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Append-only workout log. `list_all` returns newest uploads first.
pub trait WorkoutStore: Send + Sync {
    fn create(
        &self,
        summary: &WorkoutSummary,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredWorkout>, StoreError>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<Option<StoredWorkout>, StoreError>> + Send;

    /// Returns `false` when no workout had this id.
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

#[derive(Clone)]
pub enum Store {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl Store {
    /// `"memory"` selects the in-process store; anything else is a SQLite URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        if database_url == "memory" {
            tracing::info!("Using in-memory workout store");
            return Ok(Store::Memory(MemoryStore::new()));
        }
        let store = SqliteStore::new(database_url).await?;
        tracing::info!("Connected to {}", database_url);
        Ok(Store::Sqlite(store))
    }
}

impl WorkoutStore for Store {
    async fn create(&self, summary: &WorkoutSummary) -> Result<i64, StoreError> {
        match self {
            Store::Sqlite(store) => store.create(summary).await,
            Store::Memory(store) => store.create(summary).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<StoredWorkout>, StoreError> {
        match self {
            Store::Sqlite(store) => store.list_all().await,
            Store::Memory(store) => store.list_all().await,
        }
    }

    async fn get(&self, id: i64) -> Result<Option<StoredWorkout>, StoreError> {
        match self {
            Store::Sqlite(store) => store.get(id).await,
            Store::Memory(store) => store.get(id).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        match self {
            Store::Sqlite(store) => store.delete(id).await,
            Store::Memory(store) => store.delete(id).await,
        }
    }
}
