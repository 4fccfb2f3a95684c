//! # DomainError
//!
//! Every failure a store operation can report. The `Display` text is the
//! human-readable message shown next to the form that triggered it.

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("you must be logged in")]
    NotLoggedIn,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("a board with that name already exists")]
    BoardNameTaken,

    /// Unresolved username in appointment and invite flows
    #[error("user not found")]
    UserNotFound,

    /// Resource not found (e.g., Board, Post, Advertisement)
    #[error("{kind} not found with ID {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("anonymous {0} are not allowed on this board")]
    AnonymousNotAllowed(&'static str),

    #[error("this board is locked")]
    BoardLocked,

    #[error("insufficient Kopeki: {needed} needed, {available} available")]
    InsufficientKopeki { needed: u64, available: u64 },

    #[error("invalid award")]
    InvalidAward,

    #[error("this invite has already been answered")]
    InviteAlreadyResolved,

    /// Validation failure (e.g., empty title, malformed IBAN)
    #[error("validation error: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, DomainError>;
