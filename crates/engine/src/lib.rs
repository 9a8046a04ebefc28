//! Skyisle Engine library.
//!
//! Server-side island lifecycle: lazily materializing island worlds,
//! sharing them between viewers, and persisting and unloading them once
//! nobody is on them.
//!
//! ## Structure
//!
//! - `entities/` - Island session and shared world leases
//! - `use_cases/` - Entering islands, vacancy sweeps, shutdown save
//! - `stores/` - In-memory runtime state (sessions, players, coops)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures module for engine tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
