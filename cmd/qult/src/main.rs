//! # The Qult
//!
//! Assembles the store from settings (storage backend, password hasher,
//! economy), resumes the persisted session, and reports what was loaded.

mod telemetry;

use anyhow::Context;
use auth_adapters::Argon2Hasher;
use configs::{Settings, StorageBackend};
use domains::KeyValueStore;
use services::{Store, StoreOptions};
use std::sync::Arc;
use storage_adapters::{JsonFileKv, MemoryKv};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    telemetry::init(&settings.log)?;

    let kv: Arc<dyn KeyValueStore> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryKv::new()),
        StorageBackend::File => Arc::new(JsonFileKv::open(&settings.storage.data_dir).await?),
    };
    let hasher = Arc::new(Argon2Hasher::new(
        settings.auth.memory_kib,
        settings.auth.iterations,
        settings.auth.parallelism,
        settings.auth.pepper.clone(),
    )?);
    let options = StoreOptions {
        starting_balance: settings.economy.starting_balance,
        seed_demo_data: settings.seed_demo_data,
    };

    let store = Store::open(kv, hasher, options)
        .await
        .context("failed to open the store")?;
    info!(backend = ?settings.storage.backend, "🚀 The Qult store is ready");

    for board in &store.collections().boards {
        info!(
            board = %board.name,
            subscribers = store.subscriber_count(board.id),
            posts = store.collections().posts.iter().filter(|p| p.board_id == board.id).count(),
            sponsored = store.ad_for_board(board.id).is_some(),
            "board"
        );
    }
    info!(pending_ads = store.pending_ads().len(), editorials = store.editorials().len(), "moderation queue");

    let session = store.resume_session();
    match session.current_user().and_then(|id| store.user(id)) {
        Some(user) => info!(
            username = %user.username,
            kopeki = user.kopeki,
            karma = store.user_karma(user.id),
            unread = store.unread_count(&session)?,
            "resumed session"
        ),
        None => info!("no active session"),
    }

    store.flush().await;
    Ok(())
}
