//! # Store
//!
//! Single source of truth for every entity. Reads are synchronous lookups in
//! memory; every mutation updates memory first and then queues a write-behind
//! commit of the collections it touched.
//!
//! Operations are grouped by concern in the submodules; all of them take the
//! caller's [`Session`] explicitly.

mod accounts;
mod ads;
mod boards;
mod content;
mod messaging;
mod seed;
mod social;
mod state;
mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use ads::AdSpendSummary;
pub use state::Collections;
pub use wallet::{AwardTally, UnlockOutcome};

use domains::{
    Board, DomainError, KeyValueStore, MediaItem, Message, PasswordHasher, Result, Session,
    Transaction, User,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::persistence::{keys, Collection, WriteBehind};

/// Tunables supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Kopeki credited to every new account
    pub starting_balance: u64,
    /// Seed the demo dataset when the user collection loads empty
    pub seed_demo_data: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            seed_demo_data: true,
        }
    }
}

pub struct Store {
    data: Collections,
    hasher: Arc<dyn PasswordHasher>,
    writer: WriteBehind,
    options: StoreOptions,
    persisted_user: Option<Uuid>,
    persisted_anonymous_id: Option<Uuid>,
}

impl Store {
    /// Loads every collection before returning, so a store that is still
    /// initializing can never be queried. Seeds the demo dataset once if the
    /// user collection is empty.
    pub async fn open(
        kv: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn PasswordHasher>,
        options: StoreOptions,
    ) -> anyhow::Result<Self> {
        let data = Collections::load(kv.as_ref()).await?;
        let persisted_user = state::load_value::<Option<Uuid>>(kv.as_ref(), keys::CURRENT_USER)
            .await?
            .flatten();
        let persisted_anonymous_id =
            state::load_value::<Uuid>(kv.as_ref(), keys::ANONYMOUS_ID).await?;

        let mut store = Self {
            data,
            hasher,
            writer: WriteBehind::spawn(kv),
            options,
            persisted_user,
            persisted_anonymous_id,
        };

        if store.data.users.is_empty() && store.options.seed_demo_data {
            store.seed_demo_data()?;
        }

        info!(
            users = store.data.users.len(),
            boards = store.data.boards.len(),
            posts = store.data.posts.len(),
            "store hydrated"
        );
        Ok(store)
    }

    /// Rebuilds the session that was active when the store was last written.
    /// Password-board unlocks are session-only and are not restored.
    pub fn resume_session(&self) -> Session {
        let current_user = self.persisted_user.filter(|id| self.user(*id).is_some());
        Session::resumed(current_user, self.persisted_anonymous_id)
    }

    /// Waits until every queued write has been attempted.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Read-only view of every collection.
    pub fn collections(&self) -> &Collections {
        &self.data
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.data.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.data.users.iter().find(|u| u.has_username(username))
    }

    /// Display name for an author or voter id; ids without a user record are anonymous.
    pub fn display_name(&self, id: Option<Uuid>) -> &str {
        id.and_then(|id| self.user(id))
            .map(|u| u.username.as_str())
            .unwrap_or("anonymous")
    }

    pub fn board(&self, id: Uuid) -> Option<&Board> {
        self.data.boards.iter().find(|b| b.id == id)
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn user_mut(&mut self, id: Uuid) -> Result<&mut User> {
        self.data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    fn find_user(&self, id: Uuid) -> Result<&User> {
        self.user(id).ok_or_else(|| DomainError::not_found("user", id))
    }

    fn find_board(&self, id: Uuid) -> Result<&Board> {
        self.board(id).ok_or_else(|| DomainError::not_found("board", id))
    }

    fn find_message(&self, id: Uuid) -> Result<&Message> {
        self.data
            .messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| DomainError::not_found("message", id))
    }

    fn board_mut(&mut self, id: Uuid) -> Result<&mut Board> {
        self.data
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| DomainError::not_found("board", id))
    }

    /// The logged-in user, or `NotLoggedIn`.
    fn require_user(&self, session: &Session) -> Result<&User> {
        session
            .current_user()
            .and_then(|id| self.user(id))
            .ok_or(DomainError::NotLoggedIn)
    }

    fn require_site_admin(&self, session: &Session) -> Result<Uuid> {
        let user = self.require_user(session)?;
        if !user.is_admin() {
            return Err(DomainError::forbidden("site administrators only"));
        }
        Ok(user.id)
    }

    fn is_site_admin(&self, user_id: Uuid) -> bool {
        self.user(user_id).is_some_and(User::is_admin)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher
            .hash(password)
            .map_err(|e| DomainError::Hashing(e.to_string()))
    }

    /// Moves `amount` Kopeki between two users and records both ledger
    /// entries. Validates before mutating, so a failure changes nothing.
    fn transfer(
        &mut self,
        from: Uuid,
        to: Uuid,
        amount: u64,
        entries: (Transaction, Transaction),
    ) -> Result<()> {
        let available = self.find_user(from)?.kopeki;
        if available < amount {
            return Err(DomainError::InsufficientKopeki {
                needed: amount,
                available,
            });
        }
        let credited = credit(self.find_user(to)?.kopeki, amount)?;
        self.user_mut(from)?.kopeki -= amount;
        self.user_mut(to)?.kopeki = credited;
        self.data.transactions.push(entries.0);
        self.data.transactions.push(entries.1);
        Ok(())
    }

    /// Queues one commit containing every touched collection.
    fn persist(&self, touched: &[Collection]) {
        self.persist_with(touched, None::<(String, String)>);
    }

    /// Queues one commit containing every touched collection plus `extra`
    /// session entries.
    fn persist_with(&self, touched: &[Collection], extra: impl IntoIterator<Item = (String, String)>) {
        let mut entries = Vec::with_capacity(touched.len() + 1);
        for &collection in touched {
            match self.data.encode(collection) {
                Ok(json) => entries.push((collection.key().to_string(), json)),
                Err(e) => error!(key = collection.key(), error = %e, "failed to serialize collection"),
            }
        }
        entries.extend(extra);
        self.writer.commit(entries);
    }

    /// Records the logged-in user and returns its storage entry.
    fn current_user_entry(&mut self, user_id: Option<Uuid>) -> Option<(String, String)> {
        self.persisted_user = user_id;
        value_entry(keys::CURRENT_USER, &user_id)
    }

    fn persist_current_user(&mut self, user_id: Option<Uuid>) {
        let entry = self.current_user_entry(user_id);
        self.persist_with(&[], entry);
    }

    /// The voting identity: the logged-in user, or an anonymous id minted on
    /// first use. A freshly minted id comes with its storage entry, to be
    /// committed alongside the vote.
    fn actor_id(&mut self, session: &mut Session) -> (Uuid, Option<(String, String)>) {
        if let Some(id) = session.actor() {
            return (id, None);
        }
        let id = Uuid::new_v4();
        session.set_anonymous_id(id);
        self.persisted_anonymous_id = Some(id);
        (id, value_entry(keys::ANONYMOUS_ID, &id))
    }
}

fn value_entry<T: Serialize>(key: &str, value: &T) -> Option<(String, String)> {
    match serde_json::to_string(value) {
        Ok(json) => Some((key.to_string(), json)),
        Err(e) => {
            error!(key, error = %e, "failed to serialize value");
            None
        }
    }
}

/// `balance + amount`, or a validation error when the balance would overflow.
fn credit(balance: u64, amount: u64) -> Result<u64> {
    balance
        .checked_add(amount)
        .ok_or_else(|| DomainError::validation("balance limit exceeded"))
}

fn validate_media(media: &[MediaItem]) -> Result<()> {
    media.iter().try_for_each(MediaItem::validate)
}

fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
