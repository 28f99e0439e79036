//! Domain error model.

use thiserror::Error;

/// Result type used across the planning core.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic, input-driven failures live here. Language-model
/// failures are never domain errors: they degrade the plan instead of
/// rejecting it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request (or a configuration value) failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An internal invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Whether this error rejects the caller's input (as opposed to a bug).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
