//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be used by the store.

use async_trait::async_trait;

/// The local per-key object store. One entry per collection; each value is
/// the full serialized collection.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw document stored under `key`, if any.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Overwrites `key`. Last write wins.
    async fn put(&self, key: &str, value: String) -> anyhow::Result<()>;

    /// Writes several keys as one commit. Adapters apply the whole batch
    /// before acknowledging it.
    async fn put_many(&self, entries: Vec<(String, String)>) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Password hashing contract for user accounts and board passwords.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produces a salted, self-describing hash string.
    fn hash(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies `password` against a hash produced by `hash`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
