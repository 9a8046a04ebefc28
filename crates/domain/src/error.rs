//! Unified error types for the domain layer
//!
//! Provides a common error type for value-object construction and world
//! mutation, so adapters never have to fall back to String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Block coordinate or payload outside the chunk bounds
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value object cannot be built from its inputs:
    /// - Required collections are empty
    /// - Payload lengths do not match the chunk volume
    ///
    /// # Example
    /// ```ignore
    /// if members.is_empty() {
    ///     return Err(DomainError::validation("A coop needs at least one member"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an out-of-bounds error
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }
}
