//! # Write-behind persistence
//!
//! Mutations never wait for storage. Each one enqueues a commit holding the
//! full serialized value of every collection it touched; a single background
//! task drains the queue in order, so later commits always win.

use domains::KeyValueStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Storage keys for the non-collection entries.
pub mod keys {
    pub const CURRENT_USER: &str = "currentUser";
    pub const ANONYMOUS_ID: &str = "anonymousVoterId";
}

/// One persisted collection. Each lives under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Boards,
    Posts,
    ProfilePosts,
    Editorials,
    Comments,
    Messages,
    Votes,
    Subscriptions,
    Follows,
    Ads,
    Transactions,
    Awards,
}

impl Collection {
    pub const ALL: [Collection; 13] = [
        Collection::Users,
        Collection::Boards,
        Collection::Posts,
        Collection::ProfilePosts,
        Collection::Editorials,
        Collection::Comments,
        Collection::Messages,
        Collection::Votes,
        Collection::Subscriptions,
        Collection::Follows,
        Collection::Ads,
        Collection::Transactions,
        Collection::Awards,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Boards => "boards",
            Collection::Posts => "posts",
            Collection::ProfilePosts => "profilePosts",
            Collection::Editorials => "editorials",
            Collection::Comments => "comments",
            Collection::Messages => "messages",
            Collection::Votes => "votes",
            Collection::Subscriptions => "subscriptions",
            Collection::Follows => "follows",
            Collection::Ads => "ads",
            Collection::Transactions => "transactions",
            Collection::Awards => "awards",
        }
    }
}

enum WriteCommand {
    Commit(Vec<(String, String)>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer. Cloning shares the same queue.
#[derive(Clone)]
pub struct WriteBehind {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl WriteBehind {
    /// Starts the writer task on the current tokio runtime.
    pub fn spawn(kv: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(kv, rx));
        Self { tx }
    }

    /// Fire-and-forget: queues `entries` to be written as one batch.
    pub fn commit(&self, entries: Vec<(String, String)>) {
        if entries.is_empty() {
            return;
        }
        if self.tx.send(WriteCommand::Commit(entries)).is_err() {
            warn!("persistence writer has stopped; dropping commit");
        }
    }

    /// Resolves once every commit queued before this call has been attempted.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn drain(kv: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Commit(entries) => {
                let keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
                match kv.put_many(entries).await {
                    Ok(()) => debug!(?keys, "persisted"),
                    // Best effort: logged, never retried.
                    Err(e) => error!(?keys, error = %e, "failed to persist collections"),
                }
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("persistence writer stopped");
}
