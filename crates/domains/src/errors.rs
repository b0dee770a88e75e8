//! # DomainError
//!
//! The single error type that crosses port boundaries. Adapters translate
//! their own failures (sqlx, argon2, jsonwebtoken, io) into one of these.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity absent, or present but not visible to the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or out-of-range input.
    #[error("{0}")]
    Validation(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    /// Bad, expired or orphaned credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (database down, disk full, hashing failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl ToString) -> Self {
        Self::Internal(message.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// A specialized Result type for reelshelf logic.
pub type Result<T> = std::result::Result<T, DomainError>;
