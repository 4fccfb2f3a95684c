//! # domains
//!
//! The entities, value types, and ports of The Qult.
//! Nothing in this crate performs I/O; the `services` crate owns behaviour and the
//! adapter crates implement the ports.

pub mod catalog;
pub mod error;
pub mod models;
pub mod patches;
pub mod ports;

// Re-exporting for easier access in other crates
pub use catalog::*;
pub use error::*;
pub use models::*;
pub use patches::*;
pub use ports::*;
