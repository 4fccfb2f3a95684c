//! # seed
//!
//! Operator bootstrap: creates a site admin, or promotes an existing account
//! and resets its password.
//!
//! ```text
//! QULT_ADMIN_PASSWORD=... seed <username>
//! ```

use anyhow::{bail, Context};
use auth_adapters::Argon2Hasher;
use configs::{Settings, StorageBackend};
use services::{Store, StoreOptions};
use std::sync::Arc;
use storage_adapters::JsonFileKv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log.filter)?)
        .init();

    let Some(username) = std::env::args().nth(1) else {
        bail!("usage: seed <username>  (password from QULT_ADMIN_PASSWORD)");
    };
    let password = std::env::var("QULT_ADMIN_PASSWORD")
        .context("QULT_ADMIN_PASSWORD must be set")?;
    if settings.storage.backend != StorageBackend::File {
        bail!("seeding needs the file storage backend; an in-memory store would be discarded");
    }

    let kv = Arc::new(JsonFileKv::open(&settings.storage.data_dir).await?);
    let hasher = Arc::new(Argon2Hasher::new(
        settings.auth.memory_kib,
        settings.auth.iterations,
        settings.auth.parallelism,
        settings.auth.pepper.clone(),
    )?);
    let options = StoreOptions {
        starting_balance: settings.economy.starting_balance,
        seed_demo_data: false,
    };
    let mut store = Store::open(kv, hasher, options).await?;

    let admin = store.provision_admin(&username, &password)?;
    info!(user_id = %admin.id, username = %admin.username, "site admin ready");
    store.flush().await;
    Ok(())
}
