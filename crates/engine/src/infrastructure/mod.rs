//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod announcer;
pub mod clock;
pub mod config;
pub mod island_store;
pub mod membership;
pub mod ports;
pub mod world_codec;
