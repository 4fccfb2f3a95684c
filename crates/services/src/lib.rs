//! # services
//!
//! The domain store of The Qult: the in-memory object graph, the rules that
//! guard every mutation, derived queries, and write-behind persistence to a
//! [`domains::KeyValueStore`].

pub mod cipher;
pub mod persistence;
pub mod store;

pub use persistence::{Collection, WriteBehind};
pub use store::{
    AdSpendSummary, AwardTally, Collections, Store, StoreOptions, UnlockOutcome,
};
