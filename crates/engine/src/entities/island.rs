//! Island session: lazy materialization, sharing and reclamation of one
//! island's world.
//!
//! State cycle: `Unmaterialized -> Loading -> Ready -> Unmaterialized`.
//! While `Loading`, the in-flight load is cached as a shared future so every
//! concurrent caller awaits the same load and receives the same result.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use skyisle_domain::{IslandContext, IslandEvent, IslandId};
use tokio::sync::Mutex;

use super::shared_world::{SharedWorld, WorldHandle};
use crate::infrastructure::ports::{
    ClockPort, CodecError, EventAnnouncerPort, IslandStorePort, MembershipPort, StoreError,
    WorldCodecPort, ISLAND_DATA_FIELD,
};

/// Name of the template region new islands are cut from.
pub const ISLAND_TEMPLATE_NAME: &str = "island_template";

/// Tunables shared by every island.
#[derive(Debug, Clone)]
pub struct IslandSettings {
    /// Chunk radius kept around the origin when cutting a new island from the template.
    pub template_radius: u32,
    /// Upper bound on one load-or-create run.
    pub load_timeout: Duration,
}

impl Default for IslandSettings {
    fn default() -> Self {
        Self {
            template_radius: 3,
            load_timeout: Duration::from_secs(30),
        }
    }
}

/// Ports an island needs to load, announce and persist itself.
pub struct IslandServices {
    pub store: Arc<dyn IslandStorePort>,
    pub codec: Arc<dyn WorldCodecPort>,
    pub announcer: Arc<dyn EventAnnouncerPort>,
    pub membership: Arc<dyn MembershipPort>,
    pub clock: Arc<dyn ClockPort>,
    pub settings: IslandSettings,
}

/// Externally visible materialization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializationState {
    Unmaterialized,
    Loading,
    Ready,
}

/// Result of a vacancy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// Nothing loaded, nothing to do.
    NotMaterialized,
    /// Viewers still hold the world.
    Occupied { viewers: usize },
    /// World persisted and unloaded.
    Reclaimed,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum IslandError {
    #[error("Island template could not be loaded: {0}")]
    TemplateLoad(CodecError),

    #[error("Persisted world of island {island_id} is corrupt: {message}")]
    PersistedDataCorrupt { island_id: IslandId, message: String },

    #[error("Island storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("Island world could not be encoded: {0}")]
    Encode(CodecError),

    #[error("Loading island {island_id} timed out after {after:?}")]
    LoadTimedOut { island_id: IslandId, after: Duration },

    #[error("Load task for island {island_id} aborted: {message}")]
    LoadAborted { island_id: IslandId, message: String },
}

impl IslandError {
    fn corrupt(island_id: IslandId, message: impl ToString) -> Self {
        Self::PersistedDataCorrupt {
            island_id,
            message: message.to_string(),
        }
    }
}

#[derive(Clone)]
struct Loaded {
    world: Arc<SharedWorld>,
    context: IslandContext,
}

type LoadFuture = Shared<BoxFuture<'static, Result<Loaded, IslandError>>>;

enum Phase {
    Unmaterialized,
    Loading {
        generation: u64,
        load: LoadFuture,
    },
    Ready {
        world: Arc<SharedWorld>,
        context: IslandContext,
    },
}

struct Inner {
    phase: Phase,
    next_generation: u64,
}

/// One island and its materialization state machine.
pub struct Island {
    id: IslandId,
    services: Arc<IslandServices>,
    inner: Mutex<Inner>,
}

impl Island {
    pub fn new(id: IslandId, services: Arc<IslandServices>) -> Self {
        Self {
            id,
            services,
            inner: Mutex::new(Inner {
                phase: Phase::Unmaterialized,
                next_generation: 0,
            }),
        }
    }

    pub fn id(&self) -> IslandId {
        self.id
    }

    pub async fn state(&self) -> MaterializationState {
        match self.inner.lock().await.phase {
            Phase::Unmaterialized => MaterializationState::Unmaterialized,
            Phase::Loading { .. } => MaterializationState::Loading,
            Phase::Ready { .. } => MaterializationState::Ready,
        }
    }

    /// Membership resolved by the current materialization, if ready.
    pub async fn context(&self) -> Option<IslandContext> {
        match &self.inner.lock().await.phase {
            Phase::Ready { context, .. } => Some(context.clone()),
            _ => None,
        }
    }

    /// Lease the island's world, loading or creating it first if needed.
    ///
    /// Concurrent callers share one load. If that load fails, every waiter
    /// gets the same error and the island is left unmaterialized for retry.
    pub async fn materialize(&self) -> Result<WorldHandle, IslandError> {
        loop {
            let (generation, load) = {
                let mut guard = self.inner.lock().await;
                let inner = &mut *guard;
                match &inner.phase {
                    Phase::Ready { world, .. } => return Ok(WorldHandle::lease(world.clone())),
                    Phase::Loading { generation, load } => (*generation, load.clone()),
                    Phase::Unmaterialized => {
                        let generation = inner.next_generation;
                        inner.next_generation += 1;
                        let load = self.start_load();
                        inner.phase = Phase::Loading {
                            generation,
                            load: load.clone(),
                        };
                        tracing::debug!(island_id = %self.id, generation, "Island load started");
                        (generation, load)
                    }
                }
            };

            let outcome = load.await;

            let mut inner = self.inner.lock().await;
            let still_loading = matches!(
                &inner.phase,
                Phase::Loading { generation: current, .. } if *current == generation
            );

            match outcome {
                Ok(loaded) => {
                    if still_loading {
                        let handle = WorldHandle::lease(loaded.world.clone());
                        inner.phase = Phase::Ready {
                            world: loaded.world,
                            context: loaded.context,
                        };
                        tracing::info!(island_id = %self.id, "Island ready");
                        return Ok(handle);
                    }
                    if let Phase::Ready { world, .. } = &inner.phase {
                        return Ok(WorldHandle::lease(world.clone()));
                    }
                    // Reclaimed before this waiter woke up; start again from storage.
                }
                Err(e) => {
                    if still_loading {
                        inner.phase = Phase::Unmaterialized;
                        tracing::warn!(island_id = %self.id, error = %e, "Island load failed");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Persist and unload the world if nobody holds a handle to it.
    ///
    /// On a failed write the island stays ready so the next sweep retries
    /// without losing unsaved changes.
    pub async fn check_vacancy_and_reclaim(&self) -> Result<ReclaimOutcome, IslandError> {
        let mut inner = self.inner.lock().await;
        let (world, context) = match &inner.phase {
            Phase::Ready { world, context, .. } => (world.clone(), context.clone()),
            _ => return Ok(ReclaimOutcome::NotMaterialized),
        };

        let viewers = world.viewer_count();
        if viewers > 0 {
            return Ok(ReclaimOutcome::Occupied { viewers });
        }

        self.services
            .announcer
            .announce(IslandEvent::saved_to_storage(&context, self.services.clock.now()));

        self.persist(&world).await?;

        inner.phase = Phase::Unmaterialized;
        tracing::info!(island_id = %self.id, "Island reclaimed");
        Ok(ReclaimOutcome::Reclaimed)
    }

    /// Persist the world without unloading it. Returns `false` if not ready.
    pub async fn save(&self) -> Result<bool, IslandError> {
        let inner = self.inner.lock().await;
        match &inner.phase {
            Phase::Ready { world, .. } => {
                self.persist(world).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Whether `handle` leases this island's current world.
    pub async fn is_current(&self, handle: &WorldHandle) -> bool {
        match &self.inner.lock().await.phase {
            Phase::Ready { world, .. } => handle.is_backed_by(world),
            _ => false,
        }
    }

    async fn persist(&self, world: &SharedWorld) -> Result<(), IslandError> {
        let data = {
            let state = world.read().await;
            self.services.codec.encode(&state).map_err(IslandError::Encode)?
        };
        let size = data.len();
        self.services
            .store
            .put(self.id, ISLAND_DATA_FIELD, data)
            .await?;
        tracing::debug!(island_id = %self.id, bytes = size, "Island persisted");
        Ok(())
    }

    fn start_load(&self) -> LoadFuture {
        let id = self.id;
        let services = self.services.clone();
        let timeout = services.settings.load_timeout;
        let task = tokio::spawn(load_or_create(id, services));
        let abort = task.abort_handle();

        async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(IslandError::LoadAborted {
                    island_id: id,
                    message: e.to_string(),
                }),
                Err(_) => {
                    abort.abort();
                    Err(IslandError::LoadTimedOut {
                        island_id: id,
                        after: timeout,
                    })
                }
            }
        }
        .boxed()
        .shared()
    }
}

async fn load_or_create(id: IslandId, services: Arc<IslandServices>) -> Result<Loaded, IslandError> {
    let context = resolve_context(id, &services).await;

    let world = if !services.store.exists(id).await? {
        let world = services
            .codec
            .load_template(ISLAND_TEMPLATE_NAME, services.settings.template_radius)
            .await
            .map_err(IslandError::TemplateLoad)?;
        tracing::info!(island_id = %id, chunks = world.chunk_count(), "Island created from template");
        services
            .announcer
            .announce(IslandEvent::first_created(&context, services.clock.now()));
        world
    } else {
        let data = services
            .store
            .get(id, ISLAND_DATA_FIELD)
            .await?
            .ok_or_else(|| IslandError::corrupt(id, "document has no world data"))?;
        let codec = services.codec.clone();
        tokio::task::spawn_blocking(move || codec.decode(&data))
            .await
            .map_err(|e| IslandError::LoadAborted {
                island_id: id,
                message: e.to_string(),
            })?
            .map_err(|e| IslandError::corrupt(id, e))?
    };

    let shared = Arc::new(SharedWorld::new(id, world));
    services
        .announcer
        .announce(IslandEvent::fetched_from_storage(&context, services.clock.now()));

    Ok(Loaded {
        world: shared,
        context,
    })
}

/// Coop and connected members. Lookup failures degrade to a solo island
/// with whatever online data is available.
async fn resolve_context(id: IslandId, services: &IslandServices) -> IslandContext {
    let coop = match services.membership.resolve_coop(id).await {
        Ok(coop) => coop,
        Err(e) => {
            tracing::warn!(island_id = %id, error = %e, "Coop lookup failed, treating island as solo");
            None
        }
    };

    let online_members = match &coop {
        Some(coop) => services.membership.online_members(coop),
        None => services
            .membership
            .online_profile(id.solo_profile())
            .into_iter()
            .collect(),
    };

    IslandContext::new(id, coop, online_members)
}
