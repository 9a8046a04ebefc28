//! Island lifecycle events
//!
//! Announced by the engine at fixed points of an island's lifecycle so that
//! other systems (welcome messages, minion restoration, analytics) can react
//! without the island manager knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IslandId, ProfileId};
use crate::membership::{IslandContext, OnlineMember};

/// Discriminant of an [`IslandEvent`], handy for filtering and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandEventKind {
    FirstCreated,
    FetchedFromStorage,
    SavedToStorage,
    PlayerLoaded,
}

/// Lifecycle event for one island
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IslandEvent {
    /// No persisted world existed; a fresh one was built from the template.
    FirstCreated {
        island_id: IslandId,
        is_coop: bool,
        online_members: Vec<OnlineMember>,
        member_profiles: Vec<ProfileId>,
        occurred_at: DateTime<Utc>,
    },
    /// The island finished materializing (fresh or decoded).
    FetchedFromStorage {
        island_id: IslandId,
        is_coop: bool,
        online_members: Vec<OnlineMember>,
        member_profiles: Vec<ProfileId>,
        occurred_at: DateTime<Utc>,
    },
    /// The island is about to be written back and unloaded.
    SavedToStorage {
        island_id: IslandId,
        is_coop: bool,
        member_profiles: Vec<ProfileId>,
        occurred_at: DateTime<Utc>,
    },
    /// A player was placed onto a materialized island.
    PlayerLoaded {
        island_id: IslandId,
        profile_id: ProfileId,
        is_coop: bool,
        member_profiles: Vec<ProfileId>,
        occurred_at: DateTime<Utc>,
    },
}

impl IslandEvent {
    pub fn first_created(ctx: &IslandContext, occurred_at: DateTime<Utc>) -> Self {
        Self::FirstCreated {
            island_id: ctx.island_id,
            is_coop: ctx.is_coop(),
            online_members: ctx.online_members.clone(),
            member_profiles: ctx.member_profiles(),
            occurred_at,
        }
    }

    pub fn fetched_from_storage(ctx: &IslandContext, occurred_at: DateTime<Utc>) -> Self {
        Self::FetchedFromStorage {
            island_id: ctx.island_id,
            is_coop: ctx.is_coop(),
            online_members: ctx.online_members.clone(),
            member_profiles: ctx.member_profiles(),
            occurred_at,
        }
    }

    pub fn saved_to_storage(ctx: &IslandContext, occurred_at: DateTime<Utc>) -> Self {
        Self::SavedToStorage {
            island_id: ctx.island_id,
            is_coop: ctx.is_coop(),
            member_profiles: ctx.member_profiles(),
            occurred_at,
        }
    }

    pub fn player_loaded(
        ctx: &IslandContext,
        profile_id: ProfileId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::PlayerLoaded {
            island_id: ctx.island_id,
            profile_id,
            is_coop: ctx.is_coop(),
            member_profiles: ctx.member_profiles(),
            occurred_at,
        }
    }

    pub fn kind(&self) -> IslandEventKind {
        match self {
            Self::FirstCreated { .. } => IslandEventKind::FirstCreated,
            Self::FetchedFromStorage { .. } => IslandEventKind::FetchedFromStorage,
            Self::SavedToStorage { .. } => IslandEventKind::SavedToStorage,
            Self::PlayerLoaded { .. } => IslandEventKind::PlayerLoaded,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FirstCreated { .. } => "island_first_created",
            Self::FetchedFromStorage { .. } => "island_fetched_from_storage",
            Self::SavedToStorage { .. } => "island_saved_to_storage",
            Self::PlayerLoaded { .. } => "island_player_loaded",
        }
    }

    pub fn island_id(&self) -> IslandId {
        match self {
            Self::FirstCreated { island_id, .. }
            | Self::FetchedFromStorage { island_id, .. }
            | Self::SavedToStorage { island_id, .. }
            | Self::PlayerLoaded { island_id, .. } => *island_id,
        }
    }

    pub fn is_coop(&self) -> bool {
        match self {
            Self::FirstCreated { is_coop, .. }
            | Self::FetchedFromStorage { is_coop, .. }
            | Self::SavedToStorage { is_coop, .. }
            | Self::PlayerLoaded { is_coop, .. } => *is_coop,
        }
    }
}
