use std::sync::Arc;

use skyisle_domain::{IslandContext, IslandEvent, IslandId, ProfileId};

use crate::entities::{IslandError, WorldHandle};
use crate::infrastructure::ports::{ClockPort, EventAnnouncerPort};
use crate::stores::{IslandRegistry, OnlinePlayers};

/// Use case for placing a player on an island, loading it first if needed.
///
/// A connected player is moved onto the entered island so the vacancy sweep
/// follows them there. An island entered by a profile that is not connected
/// is parked for the next sweep instead.
pub struct EnterIsland {
    registry: Arc<IslandRegistry>,
    players: Arc<OnlinePlayers>,
    announcer: Arc<dyn EventAnnouncerPort>,
    clock: Arc<dyn ClockPort>,
}

impl EnterIsland {
    pub fn new(
        registry: Arc<IslandRegistry>,
        players: Arc<OnlinePlayers>,
        announcer: Arc<dyn EventAnnouncerPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            registry,
            players,
            announcer,
            clock,
        }
    }

    /// Returns the player's lease on the island world. Dropping it is what
    /// tells the vacancy sweep the player has left.
    pub async fn execute(
        &self,
        profile_id: ProfileId,
        island_id: IslandId,
    ) -> Result<WorldHandle, EnterIslandError> {
        let island = self.registry.get_or_create(island_id);
        let handle = island.materialize().await?;
        if !self.players.relocate(profile_id, island_id) {
            self.players.mark_departed(island_id);
        }

        let context = island
            .context()
            .await
            .unwrap_or_else(|| IslandContext::new(island_id, None, Vec::new()));
        self.announcer.announce(IslandEvent::player_loaded(
            &context,
            profile_id,
            self.clock.now(),
        ));

        tracing::info!(
            island_id = %island_id,
            profile_id = %profile_id,
            viewers = handle.viewer_count(),
            "Player entered island"
        );
        Ok(handle)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnterIslandError {
    #[error("Island unavailable: {0}")]
    Island(#[from] IslandError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MaterializationState;
    use crate::infrastructure::ports::{IslandStorePort, MockClockPort, ISLAND_DATA_FIELD};
    use crate::test_fixtures::{test_services, RecordingAnnouncer, TestServices};
    use crate::use_cases::island::VacancySweep;
    use chrono::{TimeZone, Utc};
    use skyisle_domain::{IslandEventKind, OnlineMember};

    fn build(t: &TestServices) -> (EnterIsland, Arc<IslandRegistry>) {
        let registry = Arc::new(IslandRegistry::new(t.services.clone()));
        let enter = EnterIsland::new(
            registry.clone(),
            t.players.clone(),
            t.announcer.clone(),
            t.services.clock.clone(),
        );
        (enter, registry)
    }

    #[tokio::test]
    async fn entering_new_island_creates_it_and_announces_player() {
        let t = test_services();
        let (enter, registry) = build(&t);
        let profile = ProfileId::new();
        let island = IslandId::for_solo_profile(profile);

        let handle = enter.execute(profile, island).await.unwrap();

        assert_eq!(handle.island_id(), island);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            t.announcer.kinds(),
            vec![
                IslandEventKind::FirstCreated,
                IslandEventKind::FetchedFromStorage,
                IslandEventKind::PlayerLoaded,
            ]
        );
        match t.announcer.events().last() {
            Some(IslandEvent::PlayerLoaded { profile_id, .. }) => assert_eq!(*profile_id, profile),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_player_shares_the_loaded_world() {
        let t = test_services();
        let (enter, _) = build(&t);
        let island = IslandId::new();

        let first = enter.execute(ProfileId::new(), island).await.unwrap();
        let second = enter.execute(ProfileId::new(), island).await.unwrap();

        assert!(first.same_world(&second));
        assert_eq!(first.viewer_count(), 2);
        assert_eq!(t.codec.template_loads(), 1);
    }

    #[tokio::test]
    async fn load_failure_is_returned_without_player_event() {
        let t = test_services();
        let (enter, _) = build(&t);
        let island = IslandId::new();
        t.store
            .put(island, ISLAND_DATA_FIELD, vec![0xFF; 4])
            .await
            .unwrap();

        let result = enter.execute(ProfileId::new(), island).await;

        assert!(matches!(
            result,
            Err(EnterIslandError::Island(IslandError::PersistedDataCorrupt { .. }))
        ));
        assert!(t.announcer.kinds().is_empty());
    }

    #[tokio::test]
    async fn player_event_is_stamped_by_the_clock() {
        let t = test_services();
        let registry = Arc::new(IslandRegistry::new(t.services.clone()));
        let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).return_const(stamp);
        let announcer = Arc::new(RecordingAnnouncer::default());
        let enter = EnterIsland::new(
            registry,
            t.players.clone(),
            announcer.clone(),
            Arc::new(clock),
        );

        drop(enter.execute(ProfileId::new(), IslandId::new()).await.unwrap());

        match announcer.events().last() {
            Some(IslandEvent::PlayerLoaded { occurred_at, .. }) => assert_eq!(*occurred_at, stamp),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn visited_island_is_reclaimed_after_the_visitor_leaves() {
        let t = test_services();
        let (enter, registry) = build(&t);
        let sweep = VacancySweep::new(registry.clone(), t.players.clone());
        let visitor = ProfileId::new();
        let home = IslandId::for_solo_profile(visitor);
        let visited = IslandId::new();
        t.players.connect(OnlineMember::new(visitor, home, "visitor"));

        let handle = enter.execute(visitor, visited).await.unwrap();
        assert_eq!(t.players.get(visitor).map(|m| m.island_id), Some(visited));
        drop(handle);
        let report = sweep.execute().await;

        assert_eq!(report.reclaimed, 1);
        assert_eq!(
            registry.lookup(visited).unwrap().state().await,
            MaterializationState::Unmaterialized
        );
    }

    #[tokio::test]
    async fn island_entered_by_unconnected_profile_is_still_swept() {
        let t = test_services();
        let (enter, registry) = build(&t);
        let sweep = VacancySweep::new(registry.clone(), t.players.clone());
        let island = IslandId::new();

        drop(enter.execute(ProfileId::new(), island).await.unwrap());
        let report = sweep.execute().await;

        assert_eq!(report.reclaimed, 1);
        assert!(t.players.is_empty());
        assert_eq!(t.store.len(), 1);
    }
}
