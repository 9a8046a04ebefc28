//! Shared in-memory world and the viewer leases handed out for it.

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use skyisle_domain::{IslandId, WorldState};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A materialized island world that any number of viewers may hold.
///
/// Every [`WorldHandle`] in existence counts as one active viewer.
pub struct SharedWorld {
    island_id: IslandId,
    state: RwLock<WorldState>,
    viewers: AtomicUsize,
}

impl SharedWorld {
    pub(crate) fn new(island_id: IslandId, state: WorldState) -> Self {
        Self {
            island_id,
            state: RwLock::new(state),
            viewers: AtomicUsize::new(0),
        }
    }

    pub fn island_id(&self) -> IslandId {
        self.island_id
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.state.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.state.write().await
    }

    /// Number of live handles.
    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }
}

/// A viewer's lease on a [`SharedWorld`].
///
/// Cloning takes another lease and dropping releases it. Leases are first
/// minted only by the owning island under its state lock, so a vacancy check
/// made under that lock cannot race a viewer count going from zero to one.
pub struct WorldHandle {
    world: Arc<SharedWorld>,
}

impl WorldHandle {
    pub(crate) fn lease(world: Arc<SharedWorld>) -> Self {
        world.viewers.fetch_add(1, Ordering::SeqCst);
        Self { world }
    }

    /// Whether both handles alias the same in-memory world.
    pub fn same_world(&self, other: &WorldHandle) -> bool {
        Arc::ptr_eq(&self.world, &other.world)
    }

    pub(crate) fn is_backed_by(&self, world: &Arc<SharedWorld>) -> bool {
        Arc::ptr_eq(&self.world, world)
    }
}

impl Clone for WorldHandle {
    fn clone(&self) -> Self {
        Self::lease(self.world.clone())
    }
}

impl Drop for WorldHandle {
    fn drop(&mut self) {
        self.world.viewers.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Deref for WorldHandle {
    type Target = SharedWorld;

    fn deref(&self) -> &SharedWorld {
        &self.world
    }
}

impl std::fmt::Debug for WorldHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldHandle")
            .field("island_id", &self.world.island_id)
            .field("viewers", &self.world.viewer_count())
            .finish()
    }
}
