//! Error types for port operations.

/// Island store operation errors with context for debugging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable or the operation failed - includes operation name for tracing.
    #[error("Storage unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    /// Stored value could not be converted.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create an Unavailable error with operation context.
    pub fn unavailable(operation: &'static str, message: impl ToString) -> Self {
        Self::Unavailable {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// World encode/decode and template errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("World data truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Not an island world (bad magic)")]
    BadMagic,

    #[error("Unsupported world format version {0}")]
    UnsupportedVersion(u16),

    #[error("Invalid world data: {0}")]
    Invalid(String),

    #[error("Island template not found: {0}")]
    TemplateMissing(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CodecError {
    pub fn invalid(message: impl ToString) -> Self {
        Self::Invalid(message.to_string())
    }

    pub fn io(message: impl ToString) -> Self {
        Self::Io(message.to_string())
    }
}
