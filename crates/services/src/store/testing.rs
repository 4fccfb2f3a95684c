//! Fixtures shared by the store's unit tests.

use domains::{MockKeyValueStore, PasswordHasher, Session};
use std::sync::Arc;

use super::{Store, StoreOptions};

/// Reversible stand-in for argon2 so tests stay fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash == format!("plain${password}")
    }
}

/// A key-value store that is empty on load and accepts every write.
pub fn accepting_kv() -> Arc<MockKeyValueStore> {
    let mut kv = MockKeyValueStore::new();
    kv.expect_get().returning(|_| Ok(None));
    kv.expect_put().returning(|_, _| Ok(()));
    kv.expect_put_many().returning(|_| Ok(()));
    kv.expect_delete().returning(|_| Ok(()));
    Arc::new(kv)
}

pub async fn empty_store() -> Store {
    let options = StoreOptions {
        seed_demo_data: false,
        ..StoreOptions::default()
    };
    Store::open(accepting_kv(), Arc::new(PlainHasher), options)
        .await
        .unwrap()
}

/// Registers `username` (password "secret") and returns its session.
pub fn sign_up(store: &mut Store, username: &str) -> Session {
    let mut session = Session::anonymous();
    store.register(&mut session, username, "secret").unwrap();
    session
}

/// Registers a user and promotes them to site admin.
pub fn sign_up_admin(store: &mut Store, username: &str) -> Session {
    let id = store.provision_admin(username, "secret").unwrap().id;
    Session::for_user(id)
}
