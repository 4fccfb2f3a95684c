//! # storage-adapters
//!
//! Implementations of [`domains::KeyValueStore`], each behind a feature:
//!
//! - `kv-memory`: process-local map, lost on exit
//! - `kv-file`: one JSON document per key under a data directory

#[cfg(feature = "kv-file")]
pub mod file;
#[cfg(feature = "kv-memory")]
pub mod memory;

#[cfg(feature = "kv-file")]
pub use file::JsonFileKv;
#[cfg(feature = "kv-memory")]
pub use memory::MemoryKv;
