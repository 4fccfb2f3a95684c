//! Shared fixtures for the scenario suites under `tests/`.

use auth_adapters::Argon2Hasher;
use domains::{KeyValueStore, Session};
use fake::faker::internet::en::Username;
use fake::Fake;
use services::{Store, StoreOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storage_adapters::MemoryKv;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";

/// Real argon2id at minimum cost.
pub fn hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(8, 1, 1, None).expect("valid argon2 params"))
}

pub fn options() -> StoreOptions {
    StoreOptions {
        seed_demo_data: false,
        ..StoreOptions::default()
    }
}

pub async fn open(kv: Arc<dyn KeyValueStore>) -> Store {
    Store::open(kv, hasher(), options()).await.expect("store opens")
}

/// A store backed by a fresh in-memory key-value store.
pub async fn memory_store() -> Store {
    open(Arc::new(MemoryKv::new())).await
}

/// Unique, realistic username.
pub fn username() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let base: String = Username().fake();
    let base: String = base.chars().take(20).collect();
    format!("{base}{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Registers a fresh user and returns their session and id.
pub fn sign_up(store: &mut Store) -> (Session, Uuid) {
    let mut session = Session::anonymous();
    let id = store
        .register(&mut session, &username(), PASSWORD)
        .expect("registration succeeds")
        .id;
    (session, id)
}

/// Registers a fresh site admin.
pub fn sign_up_admin(store: &mut Store) -> (Session, Uuid) {
    let id = store
        .provision_admin(&username(), PASSWORD)
        .expect("admin provisioned")
        .id;
    (Session::for_user(id), id)
}
