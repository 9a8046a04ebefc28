//! Coop membership and the online members seen while an island loads.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{IslandId, ProfileId};

/// A coop: several profiles sharing one island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coop {
    island_id: IslandId,
    originator: ProfileId,
    members: Vec<ProfileId>,
}

impl Coop {
    /// Create a coop. The originator is always a member and listed first.
    pub fn new(
        island_id: IslandId,
        originator: ProfileId,
        members: impl IntoIterator<Item = ProfileId>,
    ) -> Result<Self, DomainError> {
        let mut all = vec![originator];
        for member in members {
            if !all.contains(&member) {
                all.push(member);
            }
        }
        if all.len() < 2 {
            return Err(DomainError::validation(
                "a coop needs at least one member besides its originator",
            ));
        }
        Ok(Self {
            island_id,
            originator,
            members: all,
        })
    }

    pub fn island_id(&self) -> IslandId {
        self.island_id
    }

    pub fn originator(&self) -> ProfileId {
        self.originator
    }

    pub fn members(&self) -> &[ProfileId] {
        &self.members
    }

    pub fn is_member(&self, profile_id: ProfileId) -> bool {
        self.members.contains(&profile_id)
    }
}

/// A connected player, as seen by island lifecycle code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineMember {
    pub profile_id: ProfileId,
    pub island_id: IslandId,
    pub username: String,
}

impl OnlineMember {
    pub fn new(profile_id: ProfileId, island_id: IslandId, username: impl Into<String>) -> Self {
        Self {
            profile_id,
            island_id,
            username: username.into(),
        }
    }
}

/// Membership snapshot resolved when an island materializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IslandContext {
    pub island_id: IslandId,
    pub coop: Option<Coop>,
    pub online_members: Vec<OnlineMember>,
}

impl IslandContext {
    pub fn new(island_id: IslandId, coop: Option<Coop>, online_members: Vec<OnlineMember>) -> Self {
        Self {
            island_id,
            coop,
            online_members,
        }
    }

    pub fn is_coop(&self) -> bool {
        self.coop.is_some()
    }

    /// Coop members, or the island's implicit solo owner.
    pub fn member_profiles(&self) -> Vec<ProfileId> {
        member_profiles(self.island_id, self.coop.as_ref())
    }
}

/// Coop members, or the single implicit member of a solo island.
pub fn member_profiles(island_id: IslandId, coop: Option<&Coop>) -> Vec<ProfileId> {
    match coop {
        Some(coop) => coop.members().to_vec(),
        None => vec![island_id.solo_profile()],
    }
}
