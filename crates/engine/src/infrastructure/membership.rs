//! Membership lookups backed by the in-memory coop and player stores.

use std::sync::Arc;

use async_trait::async_trait;
use skyisle_domain::{Coop, IslandId, OnlineMember, ProfileId};

use crate::infrastructure::ports::{MembershipPort, StoreError};
use crate::stores::{CoopDirectory, OnlinePlayers};

pub struct DirectoryMembership {
    coops: Arc<CoopDirectory>,
    players: Arc<OnlinePlayers>,
}

impl DirectoryMembership {
    pub fn new(coops: Arc<CoopDirectory>, players: Arc<OnlinePlayers>) -> Self {
        Self { coops, players }
    }
}

#[async_trait]
impl MembershipPort for DirectoryMembership {
    async fn resolve_coop(&self, island_id: IslandId) -> Result<Option<Coop>, StoreError> {
        Ok(self.coops.get(island_id))
    }

    fn online_members(&self, coop: &Coop) -> Vec<OnlineMember> {
        coop.members()
            .iter()
            .filter_map(|profile_id| self.players.get(*profile_id))
            .collect()
    }

    fn online_profile(&self, profile_id: ProfileId) -> Option<OnlineMember> {
        self.players.get(profile_id)
    }
}
