//! Island document storage: SQLite for deployments, DashMap for tests and dev.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use skyisle_domain::IslandId;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{ClockPort, IslandStorePort, StoreError};

/// SQLite implementation of the island document store.
///
/// One row per (island, field); the island id is stored in its hyphenated
/// string form, matching the key namespace other tools expect.
pub struct SqliteIslandStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteIslandStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| StoreError::unavailable("island_store_connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS island_documents (
                island_id TEXT NOT NULL,
                field TEXT NOT NULL,
                data BLOB NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (island_id, field)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::unavailable("island_store_schema", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl IslandStorePort for SqliteIslandStore {
    async fn exists(&self, island_id: IslandId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM island_documents WHERE island_id = ? LIMIT 1")
            .bind(island_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable("island_exists", e))?;
        Ok(row.is_some())
    }

    async fn get(&self, island_id: IslandId, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row = sqlx::query("SELECT data FROM island_documents WHERE island_id = ? AND field = ?")
            .bind(island_id.to_string())
            .bind(field)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable("island_get", e))?;

        match row {
            Some(row) => {
                let data: Vec<u8> = row.try_get("data").map_err(StoreError::serialization)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, island_id: IslandId, field: &str, data: Vec<u8>) -> Result<(), StoreError> {
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO island_documents (island_id, field, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(island_id, field) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(island_id.to_string())
        .bind(field)
        .bind(data)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::unavailable("island_put", e))?;

        Ok(())
    }
}

/// In-memory island document store.
#[derive(Default)]
pub struct InMemoryIslandStore {
    documents: DashMap<String, HashMap<String, Vec<u8>>>,
}

impl InMemoryIslandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of islands with at least one stored field.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl IslandStorePort for InMemoryIslandStore {
    async fn exists(&self, island_id: IslandId) -> Result<bool, StoreError> {
        Ok(self.documents.contains_key(&island_id.to_string()))
    }

    async fn get(&self, island_id: IslandId, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .documents
            .get(&island_id.to_string())
            .and_then(|doc| doc.get(field).cloned()))
    }

    async fn put(&self, island_id: IslandId, field: &str, data: Vec<u8>) -> Result<(), StoreError> {
        self.documents
            .entry(island_id.to_string())
            .or_default()
            .insert(field.to_string(), data);
        Ok(())
    }
}
