//! Entity modules - Domain capability encapsulation.
//!
//! Each module wraps operations for a domain entity type.
//! They depend on infrastructure ports and provide the building blocks for use cases.

pub mod island;
pub mod shared_world;

pub use island::{
    Island, IslandError, IslandServices, IslandSettings, MaterializationState, ReclaimOutcome,
    ISLAND_TEMPLATE_NAME,
};
pub use shared_world::{SharedWorld, WorldHandle};
