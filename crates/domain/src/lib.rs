//! Skyisle domain types.
//!
//! Identities, the in-memory island world, coop membership and the
//! lifecycle events announced around materialization and eviction.

pub mod error;
pub mod events;
pub mod ids;
pub mod membership;
pub mod world;

pub use error::DomainError;
pub use events::{IslandEvent, IslandEventKind};
pub use ids::{IslandId, ProfileId};
pub use membership::{member_profiles, Coop, IslandContext, OnlineMember};
pub use world::{Chunk, ChunkBlocks, ChunkPos, WorldState, AIR, CHUNK_EDGE, CHUNK_HEIGHT, CHUNK_VOLUME};
