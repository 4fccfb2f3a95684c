use anyhow::Context;
use domains::{
    Advertisement, Award, Board, Comment, Editorial, Follow, KeyValueStore, Message, Post,
    ProfilePost, Subscription, Transaction, User, Vote,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::persistence::Collection;

/// Every entity collection, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    pub users: Vec<User>,
    pub boards: Vec<Board>,
    pub posts: Vec<Post>,
    pub profile_posts: Vec<ProfilePost>,
    pub editorials: Vec<Editorial>,
    pub comments: Vec<Comment>,
    pub messages: Vec<Message>,
    pub votes: Vec<Vote>,
    pub subscriptions: Vec<Subscription>,
    pub follows: Vec<Follow>,
    pub ads: Vec<Advertisement>,
    pub transactions: Vec<Transaction>,
    pub awards: Vec<Award>,
}

impl Collections {
    /// Rehydrates every collection. Missing keys load as empty collections.
    pub async fn load(kv: &dyn KeyValueStore) -> anyhow::Result<Self> {
        Ok(Self {
            users: load_list(kv, Collection::Users).await?,
            boards: load_list(kv, Collection::Boards).await?,
            posts: load_list(kv, Collection::Posts).await?,
            profile_posts: load_list(kv, Collection::ProfilePosts).await?,
            editorials: load_list(kv, Collection::Editorials).await?,
            comments: load_list(kv, Collection::Comments).await?,
            messages: load_list(kv, Collection::Messages).await?,
            votes: load_list(kv, Collection::Votes).await?,
            subscriptions: load_list(kv, Collection::Subscriptions).await?,
            follows: load_list(kv, Collection::Follows).await?,
            ads: load_list(kv, Collection::Ads).await?,
            transactions: load_list(kv, Collection::Transactions).await?,
            awards: load_list(kv, Collection::Awards).await?,
        })
    }

    /// Serializes one collection in full.
    pub fn encode(&self, collection: Collection) -> serde_json::Result<String> {
        match collection {
            Collection::Users => serde_json::to_string(&self.users),
            Collection::Boards => serde_json::to_string(&self.boards),
            Collection::Posts => serde_json::to_string(&self.posts),
            Collection::ProfilePosts => serde_json::to_string(&self.profile_posts),
            Collection::Editorials => serde_json::to_string(&self.editorials),
            Collection::Comments => serde_json::to_string(&self.comments),
            Collection::Messages => serde_json::to_string(&self.messages),
            Collection::Votes => serde_json::to_string(&self.votes),
            Collection::Subscriptions => serde_json::to_string(&self.subscriptions),
            Collection::Follows => serde_json::to_string(&self.follows),
            Collection::Ads => serde_json::to_string(&self.ads),
            Collection::Transactions => serde_json::to_string(&self.transactions),
            Collection::Awards => serde_json::to_string(&self.awards),
        }
    }
}

async fn load_list<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    collection: Collection,
) -> anyhow::Result<Vec<T>> {
    load_value(kv, collection.key())
        .await
        .map(Option::unwrap_or_default)
}

/// Reads and decodes a single key.
pub(crate) async fn load_value<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> anyhow::Result<Option<T>> {
    let Some(raw) = kv
        .get(key)
        .await
        .with_context(|| format!("failed to read '{key}'"))?
    else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).with_context(|| format!("corrupt document under '{key}'"))?;
    Ok(Some(value))
}
