//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Infrastructure
/// concerns (storage backends, advisor transport) have their own error types
/// and are mapped into this taxonomy at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced item or user is absent (or soft-deleted where that
    /// counts as absent).
    #[error("not found: {0}")]
    NotFound(String),

    /// A ledger event would violate an invariant: negative resulting
    /// quantity, zero delta, or a malformed kind/delta combination.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A unique constraint was violated (duplicate SKU, username, API key)
    /// or a serialized write lost its race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value failed validation (malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
