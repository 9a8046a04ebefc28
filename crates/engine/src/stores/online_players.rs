//! Connected players and the islands they left behind.

use std::collections::HashSet;
use std::sync::Mutex;

use dashmap::DashMap;
use skyisle_domain::{IslandId, OnlineMember, ProfileId};

/// Connected players, keyed by profile.
///
/// When a player disconnects their island id is parked in a departed set
/// until the next sweep takes it, so an island whose last player left the
/// server is still visited and reclaimed.
#[derive(Default)]
pub struct OnlinePlayers {
    players: DashMap<ProfileId, OnlineMember>,
    departed: Mutex<HashSet<IslandId>>,
}

impl OnlinePlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, member: OnlineMember) {
        tracing::debug!(
            profile_id = %member.profile_id,
            island_id = %member.island_id,
            "Player connected"
        );
        if let Some(previous) = self.players.insert(member.profile_id, member.clone()) {
            if previous.island_id != member.island_id {
                self.mark_departed(previous.island_id);
            }
        }
    }

    pub fn disconnect(&self, profile_id: ProfileId) -> Option<OnlineMember> {
        let (_, member) = self.players.remove(&profile_id)?;
        tracing::debug!(
            profile_id = %profile_id,
            island_id = %member.island_id,
            "Player disconnected"
        );
        self.mark_departed(member.island_id);
        Some(member)
    }

    pub fn get(&self, profile_id: ProfileId) -> Option<OnlineMember> {
        self.players.get(&profile_id).map(|entry| entry.value().clone())
    }

    /// Move a connected player onto another island, parking the one they
    /// left. Returns false when the profile is not connected.
    pub fn relocate(&self, profile_id: ProfileId, island_id: IslandId) -> bool {
        let previous = match self.players.get_mut(&profile_id) {
            Some(mut member) => std::mem::replace(&mut member.island_id, island_id),
            None => return false,
        };
        if previous != island_id {
            tracing::debug!(
                profile_id = %profile_id,
                from = %previous,
                to = %island_id,
                "Player moved island"
            );
            self.mark_departed(previous);
        }
        true
    }

    /// Distinct islands of every connected player.
    pub fn island_ids(&self) -> Vec<IslandId> {
        let ids: HashSet<IslandId> = self.players.iter().map(|entry| entry.island_id).collect();
        ids.into_iter().collect()
    }

    /// Drain islands whose players have left since the last call.
    pub fn take_departed(&self) -> Vec<IslandId> {
        match self.departed.lock() {
            Ok(mut departed) => departed.drain().collect(),
            Err(poisoned) => poisoned.into_inner().drain().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Park an island for the next sweep.
    pub fn mark_departed(&self, island_id: IslandId) {
        match self.departed.lock() {
            Ok(mut departed) => departed.insert(island_id),
            Err(poisoned) => poisoned.into_inner().insert(island_id),
        };
    }
}
