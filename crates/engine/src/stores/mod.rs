//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `IslandRegistry` - one session per island
//! - `OnlinePlayers` - connected players and departed islands
//! - `CoopDirectory` - coop membership

pub mod coop_directory;
pub mod island_registry;
pub mod online_players;

pub use coop_directory::CoopDirectory;
pub use island_registry::IslandRegistry;
pub use online_players::OnlinePlayers;
