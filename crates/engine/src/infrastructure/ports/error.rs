//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Store operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Business constraint violated.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store does not offer this operation (e.g. a missing remote procedure).
    #[error("Operation unavailable: {operation}")]
    Unavailable { operation: &'static str },
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Create a ConstraintViolation error.
    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    pub fn unavailable(operation: &'static str) -> Self {
        Self::Unavailable { operation }
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Errors after which a client-side read-modify-write may be attempted.
    ///
    /// Missing rows and rejected input are reported as-is.
    pub fn permits_fallback(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Database { .. })
    }
}

/// Errors from an optional plan augmenter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AugmentError {
    #[error("Augmentation request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid augmentation: {0}")]
    InvalidResponse(String),
}
