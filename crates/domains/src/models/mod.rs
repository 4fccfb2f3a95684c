//! # Domain Models
//!
//! These structs represent the core entities of The Qult.
//! Every entity is keyed by a UUID v4 and serialised with camelCase field
//! names, which is also the persisted layout.

pub mod ad;
pub mod board;
pub mod content;
pub mod message;
pub mod session;
pub mod social;
pub mod user;
pub mod wallet;

pub use ad::*;
pub use board::*;
pub use content::*;
pub use message::*;
pub use session::*;
pub use social::*;
pub use user::*;
pub use wallet::*;

/// Usernames and board names are unique ignoring case, across all scripts.
fn same_name(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.trim().to_lowercase()
}
