//! Storage port for persisted island documents.

use async_trait::async_trait;
use skyisle_domain::IslandId;

use super::error::StoreError;

/// Field under which the encoded world of an island is stored.
pub const ISLAND_DATA_FIELD: &str = "data";

/// Key-value document store, one document per island.
///
/// The island id, stringified, is the document key; each document holds
/// opaque byte fields.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IslandStorePort: Send + Sync {
    /// Whether any document exists for this island.
    async fn exists(&self, island_id: IslandId) -> Result<bool, StoreError>;

    async fn get(&self, island_id: IslandId, field: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite a field.
    async fn put(&self, island_id: IslandId, field: &str, data: Vec<u8>) -> Result<(), StoreError>;
}
