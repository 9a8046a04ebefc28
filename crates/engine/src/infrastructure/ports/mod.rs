//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Island document storage (could swap SQLite -> MongoDB)
//! - World encoding and template loading (could swap the chunk format)
//! - Lifecycle event announcement (could swap tracing -> message bus)
//! - Coop membership and online player lookup
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Storage Ports
// =============================================================================
pub use repos::{IslandStorePort, ISLAND_DATA_FIELD};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{EventAnnouncerPort, MembershipPort, WorldCodecPort};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::MockIslandStorePort;

#[cfg(test)]
pub use external::{MockEventAnnouncerPort, MockMembershipPort, MockWorldCodecPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{CodecError, StoreError};
