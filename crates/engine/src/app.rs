//! Application state and composition.

use std::sync::Arc;

use crate::entities::IslandServices;
use crate::infrastructure::{
    announcer::{BroadcastAnnouncer, FanoutAnnouncer, TracingAnnouncer},
    config::IslandConfig,
    membership::DirectoryMembership,
    ports::{ClockPort, EventAnnouncerPort, IslandStorePort, WorldCodecPort},
};
use crate::stores::{CoopDirectory, IslandRegistry, OnlinePlayers};
use crate::use_cases::island::{EnterIsland, IslandUseCases, SaveAllIslands, VacancySweep};

/// Capacity of the in-process island event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Main application state.
///
/// Holds the runtime stores and the island use cases.
pub struct App {
    pub config: IslandConfig,
    pub stores: Stores,
    pub use_cases: IslandUseCases,
    /// Subscribe here to observe island lifecycle events in-process.
    pub events: BroadcastAnnouncer,
}

/// Container for in-memory runtime state.
pub struct Stores {
    pub islands: Arc<IslandRegistry>,
    pub players: Arc<OnlinePlayers>,
    pub coops: Arc<CoopDirectory>,
}

impl App {
    /// Wire the application around the given storage, codec and clock.
    pub fn new(
        config: IslandConfig,
        store: Arc<dyn IslandStorePort>,
        codec: Arc<dyn WorldCodecPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let events = BroadcastAnnouncer::new(EVENT_CHANNEL_CAPACITY);
        let announcer: Arc<dyn EventAnnouncerPort> = Arc::new(FanoutAnnouncer::new(vec![
            Arc::new(TracingAnnouncer),
            Arc::new(events.clone()),
        ]));

        let players = Arc::new(OnlinePlayers::new());
        let coops = Arc::new(CoopDirectory::new());
        let membership = Arc::new(DirectoryMembership::new(coops.clone(), players.clone()));

        let services = Arc::new(IslandServices {
            store,
            codec,
            announcer: announcer.clone(),
            membership,
            clock: clock.clone(),
            settings: config.island_settings(),
        });
        let islands = Arc::new(IslandRegistry::new(services));

        let use_cases = IslandUseCases::new(
            Arc::new(EnterIsland::new(
                islands.clone(),
                players.clone(),
                announcer,
                clock,
            )),
            Arc::new(VacancySweep::new(islands.clone(), players.clone())),
            Arc::new(SaveAllIslands::new(islands.clone())),
        );

        Self {
            config,
            stores: Stores {
                islands,
                players,
                coops,
            },
            use_cases,
            events,
        }
    }
}
