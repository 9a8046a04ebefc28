//! Registry of island sessions.
//!
//! At most one [`Island`] exists per id. Sessions are created on first
//! request and kept for the life of the process; an island that was
//! reclaimed simply returns to `Unmaterialized` and is reused on next entry.

use std::sync::Arc;

use dashmap::DashMap;
use skyisle_domain::IslandId;

use crate::entities::{Island, IslandServices};

pub struct IslandRegistry {
    islands: DashMap<IslandId, Arc<Island>>,
    services: Arc<IslandServices>,
}

impl IslandRegistry {
    pub fn new(services: Arc<IslandServices>) -> Self {
        Self {
            islands: DashMap::new(),
            services,
        }
    }

    /// The session for `id`, creating it if absent. Concurrent callers for
    /// the same id always receive the same session.
    pub fn get_or_create(&self, id: IslandId) -> Arc<Island> {
        self.islands
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(island_id = %id, "Island session created");
                Arc::new(Island::new(id, self.services.clone()))
            })
            .clone()
    }

    pub fn lookup(&self, id: IslandId) -> Option<Arc<Island>> {
        self.islands.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn island_ids(&self) -> Vec<IslandId> {
        self.islands.iter().map(|entry| *entry.key()).collect()
    }

    /// Snapshot of every session, for whole-registry passes like a shutdown save.
    pub fn islands(&self) -> Vec<Arc<Island>> {
        self.islands.iter().map(|entry| entry.value().clone()).collect()
    }
}
