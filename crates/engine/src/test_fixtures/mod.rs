//! Shared fakes and builders for engine tests.
//!
//! Mocks from `mockall` cover single-call expectations; the fakes here are for
//! tests that need real behavior (a working codec, an ordered event log, a
//! live membership table).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use skyisle_domain::{Chunk, ChunkPos, IslandEvent, IslandEventKind, IslandId, WorldState};

use crate::entities::{IslandServices, IslandSettings};
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::island_store::InMemoryIslandStore;
use crate::infrastructure::membership::DirectoryMembership;
use crate::infrastructure::ports::{
    CodecError, EventAnnouncerPort, IslandStorePort, MembershipPort, StoreError, WorldCodecPort,
};
use crate::infrastructure::world_codec::{decode_world, encode_world};
use crate::stores::{CoopDirectory, OnlinePlayers};

// =============================================================================
// Worlds
// =============================================================================

/// Small starter island: a stone platform with a tree stump in the middle.
pub fn template_world() -> WorldState {
    let mut world = WorldState::from_chunks(
        (-1..=1).flat_map(|x| (-1..=1).map(move |z| Chunk::uniform(ChunkPos::new(x, z), 1))),
    );
    for y in 0..4 {
        // Positions inside the template are always in bounds.
        let _ = world.set_block(8, y, 8, 17);
    }
    world
}

// =============================================================================
// Codec
// =============================================================================

/// Real binary codec with an in-memory template, a call counter and an
/// optional artificial delay on template loads.
pub struct TemplateCodec {
    template: Option<WorldState>,
    delay: Option<Duration>,
    template_loads: AtomicUsize,
}

impl TemplateCodec {
    pub fn new(template: WorldState) -> Self {
        Self {
            template: Some(template),
            delay: None,
            template_loads: AtomicUsize::new(0),
        }
    }

    /// A codec whose template is missing.
    pub fn failing() -> Self {
        Self {
            template: None,
            delay: None,
            template_loads: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn template_loads(&self) -> usize {
        self.template_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorldCodecPort for TemplateCodec {
    fn encode(&self, world: &WorldState) -> Result<Vec<u8>, CodecError> {
        encode_world(world)
    }

    fn decode(&self, data: &[u8]) -> Result<WorldState, CodecError> {
        decode_world(data)
    }

    async fn load_template(&self, name: &str, radius: u32) -> Result<WorldState, CodecError> {
        self.template_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.template
            .as_ref()
            .map(|world| world.clone().select_radius(radius))
            .ok_or_else(|| CodecError::TemplateMissing(name.to_string()))
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory store whose writes take a while to land.
pub struct SlowStore {
    inner: InMemoryIslandStore,
    put_delay: Duration,
    puts: AtomicUsize,
}

impl SlowStore {
    pub fn new(put_delay: Duration) -> Self {
        Self {
            inner: InMemoryIslandStore::new(),
            put_delay,
            puts: AtomicUsize::new(0),
        }
    }

    /// Completed writes.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IslandStorePort for SlowStore {
    async fn exists(&self, island_id: IslandId) -> Result<bool, StoreError> {
        self.inner.exists(island_id).await
    }

    async fn get(&self, island_id: IslandId, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(island_id, field).await
    }

    async fn put(&self, island_id: IslandId, field: &str, data: Vec<u8>) -> Result<(), StoreError> {
        tokio::time::sleep(self.put_delay).await;
        self.inner.put(island_id, field, data).await?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Announcer
// =============================================================================

/// Keeps every announced event in order.
#[derive(Default)]
pub struct RecordingAnnouncer {
    events: Mutex<Vec<IslandEvent>>,
}

impl RecordingAnnouncer {
    pub fn events(&self) -> Vec<IslandEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<IslandEventKind> {
        self.events().iter().map(IslandEvent::kind).collect()
    }
}

impl EventAnnouncerPort for RecordingAnnouncer {
    fn announce(&self, event: IslandEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// =============================================================================
// Services
// =============================================================================

/// Membership with no coops and nobody online.
pub fn solo_membership() -> Arc<dyn MembershipPort> {
    Arc::new(DirectoryMembership::new(
        Arc::new(CoopDirectory::new()),
        Arc::new(OnlinePlayers::new()),
    ))
}

/// Island services wired to in-memory fakes, with handles to each fake.
pub struct TestServices {
    pub store: Arc<InMemoryIslandStore>,
    pub codec: Arc<TemplateCodec>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub coops: Arc<CoopDirectory>,
    pub players: Arc<OnlinePlayers>,
    pub services: Arc<IslandServices>,
}

pub fn test_services() -> TestServices {
    let store = Arc::new(InMemoryIslandStore::new());
    let codec = Arc::new(TemplateCodec::new(template_world()));
    let announcer = Arc::new(RecordingAnnouncer::default());
    let coops = Arc::new(CoopDirectory::new());
    let players = Arc::new(OnlinePlayers::new());
    let services = Arc::new(IslandServices {
        store: store.clone(),
        codec: codec.clone(),
        announcer: announcer.clone(),
        membership: Arc::new(DirectoryMembership::new(coops.clone(), players.clone())),
        clock: Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap(),
        )),
        settings: IslandSettings::default(),
    });
    TestServices {
        store,
        codec,
        announcer,
        coops,
        players,
        services,
    }
}
