use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::entities::ReclaimOutcome;
use crate::stores::{IslandRegistry, OnlinePlayers};

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Islands with a session that were checked.
    pub visited: usize,
    pub reclaimed: usize,
    pub occupied: usize,
    pub failed: usize,
}

/// Use case for reclaiming islands nobody is viewing.
///
/// Visits the islands of every connected player plus islands players have
/// left since the previous sweep. A left island that is still held, or
/// whose save failed, is parked again so the next sweep returns to it.
/// A failure on one island does not stop the others.
pub struct VacancySweep {
    registry: Arc<IslandRegistry>,
    players: Arc<OnlinePlayers>,
}

impl VacancySweep {
    pub fn new(registry: Arc<IslandRegistry>, players: Arc<OnlinePlayers>) -> Self {
        Self { registry, players }
    }

    pub async fn execute(&self) -> SweepReport {
        let live: HashSet<_> = self.players.island_ids().into_iter().collect();
        let candidates: BTreeSet<_> = live
            .iter()
            .copied()
            .chain(self.players.take_departed())
            .collect();

        let mut report = SweepReport::default();
        for island_id in candidates {
            let Some(island) = self.registry.lookup(island_id) else {
                continue;
            };
            report.visited += 1;

            match island.check_vacancy_and_reclaim().await {
                Ok(ReclaimOutcome::Reclaimed) => report.reclaimed += 1,
                Ok(ReclaimOutcome::Occupied { .. }) => {
                    if !live.contains(&island_id) {
                        self.players.mark_departed(island_id);
                    }
                    report.occupied += 1;
                }
                Ok(ReclaimOutcome::NotMaterialized) => {}
                Err(e) => {
                    tracing::warn!(
                        island_id = %island_id,
                        error = %e,
                        "Island reclaim failed, will retry next sweep"
                    );
                    self.players.mark_departed(island_id);
                    report.failed += 1;
                }
            }
        }

        if report.reclaimed > 0 || report.failed > 0 {
            tracing::debug!(
                visited = report.visited,
                reclaimed = report.reclaimed,
                occupied = report.occupied,
                failed = report.failed,
                "Vacancy sweep finished"
            );
        }
        report
    }
}

/// Run `sweep` every `interval` until `cancel_token` fires.
pub async fn run_vacancy_sweeper(
    sweep: Arc<VacancySweep>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Starting vacancy sweeper");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!("Vacancy sweeper shutting down");
                break;
            }
            _ = ticker.tick() => {
                sweep.execute().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{IslandServices, IslandSettings, MaterializationState};
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::membership::DirectoryMembership;
    use crate::infrastructure::ports::{MockIslandStorePort, StoreError};
    use crate::stores::CoopDirectory;
    use crate::test_fixtures::{
        template_world, test_services, RecordingAnnouncer, TemplateCodec, TestServices,
    };
    use chrono::Utc;
    use skyisle_domain::{IslandId, OnlineMember, ProfileId};

    fn build(t: &TestServices) -> (VacancySweep, Arc<IslandRegistry>) {
        let registry = Arc::new(IslandRegistry::new(t.services.clone()));
        (VacancySweep::new(registry.clone(), t.players.clone()), registry)
    }

    fn connect(players: &OnlinePlayers, island_id: IslandId) -> ProfileId {
        let profile = ProfileId::new();
        players.connect(OnlineMember::new(profile, island_id, "player"));
        profile
    }

    #[tokio::test]
    async fn vacant_island_of_online_player_is_reclaimed() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        connect(&t.players, island_id);
        let island = registry.get_or_create(island_id);
        drop(island.materialize().await.unwrap());

        let report = sweep.execute().await;

        assert_eq!(
            report,
            SweepReport {
                visited: 1,
                reclaimed: 1,
                occupied: 0,
                failed: 0
            }
        );
        assert_eq!(island.state().await, MaterializationState::Unmaterialized);
        assert_eq!(t.store.len(), 1);
    }

    #[tokio::test]
    async fn held_island_is_left_alone() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        connect(&t.players, island_id);
        connect(&t.players, island_id);
        let _handle = registry.get_or_create(island_id).materialize().await.unwrap();

        let report = sweep.execute().await;

        assert_eq!(report.visited, 1);
        assert_eq!(report.occupied, 1);
        assert!(t.store.is_empty());
    }

    #[tokio::test]
    async fn island_left_by_its_last_player_is_reclaimed() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        let profile = connect(&t.players, island_id);
        let handle = registry.get_or_create(island_id).materialize().await.unwrap();

        drop(handle);
        t.players.disconnect(profile);
        let report = sweep.execute().await;

        assert_eq!(report.reclaimed, 1);
        assert_eq!(sweep.execute().await, SweepReport::default());
    }

    #[tokio::test]
    async fn left_island_still_held_is_reclaimed_once_released() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        let profile = connect(&t.players, island_id);
        let island = registry.get_or_create(island_id);
        let handle = island.materialize().await.unwrap();

        t.players.disconnect(profile);
        let held = sweep.execute().await;
        assert_eq!(held.occupied, 1);
        assert_eq!(island.state().await, MaterializationState::Ready);

        drop(handle);
        let released = sweep.execute().await;

        assert_eq!(released.reclaimed, 1);
        assert_eq!(island.state().await, MaterializationState::Unmaterialized);
        assert_eq!(t.store.len(), 1);
    }

    #[tokio::test]
    async fn held_island_of_online_player_is_not_parked() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        connect(&t.players, island_id);
        let _handle = registry.get_or_create(island_id).materialize().await.unwrap();

        sweep.execute().await;

        assert!(t.players.take_departed().is_empty());
    }

    #[tokio::test]
    async fn islands_without_session_are_skipped() {
        let t = test_services();
        let (sweep, _) = build(&t);
        connect(&t.players, IslandId::new());

        assert_eq!(sweep.execute().await, SweepReport::default());
    }

    #[tokio::test]
    async fn one_failing_island_does_not_stop_the_sweep() {
        let bad = IslandId::new();
        let mut store = MockIslandStorePort::new();
        store.expect_exists().returning(|_| Ok(false));
        store.expect_put().returning(move |id, _, _| {
            if id == bad {
                Err(StoreError::unavailable("island_put", "disk full"))
            } else {
                Ok(())
            }
        });
        let players = Arc::new(OnlinePlayers::new());
        let services = Arc::new(IslandServices {
            store: Arc::new(store),
            codec: Arc::new(TemplateCodec::new(template_world())),
            announcer: Arc::new(RecordingAnnouncer::default()),
            membership: Arc::new(DirectoryMembership::new(
                Arc::new(CoopDirectory::new()),
                players.clone(),
            )),
            clock: Arc::new(FixedClock(Utc::now())),
            settings: IslandSettings::default(),
        });
        let registry = Arc::new(IslandRegistry::new(services));
        let sweep = VacancySweep::new(registry.clone(), players.clone());

        let good = IslandId::new();
        for id in [bad, good] {
            let profile = connect(&players, id);
            drop(registry.get_or_create(id).materialize().await.unwrap());
            players.disconnect(profile);
        }

        let report = sweep.execute().await;
        assert_eq!(report.reclaimed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            registry.lookup(bad).unwrap().state().await,
            MaterializationState::Ready
        );

        let retry = sweep.execute().await;
        assert_eq!(retry.visited, 1);
        assert_eq!(retry.failed, 1);
    }

    #[tokio::test]
    async fn sweeper_runs_until_cancelled() {
        let t = test_services();
        let (sweep, registry) = build(&t);
        let island_id = IslandId::new();
        connect(&t.players, island_id);
        let island = registry.get_or_create(island_id);
        drop(island.materialize().await.unwrap());

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_vacancy_sweeper(
            Arc::new(sweep),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::timeout(Duration::from_secs(2), async {
            while island.state().await != MaterializationState::Unmaterialized {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
