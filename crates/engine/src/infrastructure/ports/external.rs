//! External service port traits (world codec, event announcement, membership).

use async_trait::async_trait;
use skyisle_domain::{Coop, IslandEvent, IslandId, OnlineMember, ProfileId, WorldState};

use super::error::{CodecError, StoreError};

// =============================================================================
// World Codec
// =============================================================================

/// Converts between in-memory worlds and persisted bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldCodecPort: Send + Sync {
    fn encode(&self, world: &WorldState) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<WorldState, CodecError>;

    /// Load the named template region, keeping chunks within `radius` of the origin.
    async fn load_template(&self, name: &str, radius: u32) -> Result<WorldState, CodecError>;
}

// =============================================================================
// Event Announcement
// =============================================================================

/// Fire-and-forget sink for island lifecycle events.
#[cfg_attr(test, mockall::automock)]
pub trait EventAnnouncerPort: Send + Sync {
    fn announce(&self, event: IslandEvent);
}

// =============================================================================
// Membership
// =============================================================================

/// Coop lookup and connected-player queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipPort: Send + Sync {
    /// Coop owning this island, if any. `None` means a solo island.
    async fn resolve_coop(&self, island_id: IslandId) -> Result<Option<Coop>, StoreError>;

    /// Coop members currently connected. Empty when nobody is online.
    fn online_members(&self, coop: &Coop) -> Vec<OnlineMember>;

    /// A connected profile, or `None` if its data is not loaded yet.
    fn online_profile(&self, profile_id: ProfileId) -> Option<OnlineMember>;
}
