//! Wallet: buying and selling Kopeki, awards, and paid profile-post unlocks.
//!
//! Every transfer validates first and then applies balances, ledger entries,
//! and the resulting records together, persisting them in a single commit.

use chrono::Utc;
use domains::{
    award_type, currency_value, Award, AwardTarget, AwardType, DomainError, Message, Result,
    Session, Transaction, TransactionType,
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{credit, Store};
use crate::persistence::Collection;

/// Awards of one type received by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardTally {
    pub award: &'static AwardType,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    /// The viewer had already paid; nothing was charged
    AlreadyUnlocked,
}

impl Store {
    /// Credits purchased Kopeki. Payment itself happens outside the store.
    pub fn buy_kopeki(&mut self, session: &Session, amount: u64) -> Result<u64> {
        let user = self.require_user(session)?;
        if amount == 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        let (user_id, balance) = (user.id, credit(user.kopeki, amount)?);
        self.user_mut(user_id)?.kopeki = balance;
        self.data.transactions.push(
            Transaction::new(
                user_id,
                TransactionType::Buy,
                amount,
                format!("Bought {amount} Kopeki for {:.2}", currency_value(amount)),
            )
            .with_currency(),
        );
        self.persist(&[Collection::Users, Collection::Transactions]);
        info!(user_id = %user_id, amount, "kopeki bought");
        Ok(balance)
    }

    pub fn sell_kopeki(&mut self, session: &Session, amount: u64) -> Result<u64> {
        let user = self.require_user(session)?;
        if amount == 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        if user.kopeki < amount {
            return Err(DomainError::InsufficientKopeki {
                needed: amount,
                available: user.kopeki,
            });
        }
        let user_id = user.id;
        let user = self.user_mut(user_id)?;
        user.kopeki -= amount;
        let balance = user.kopeki;
        self.data.transactions.push(
            Transaction::new(
                user_id,
                TransactionType::Sell,
                amount,
                format!("Sold {amount} Kopeki for {:.2}", currency_value(amount)),
            )
            .with_currency(),
        );
        self.persist(&[Collection::Users, Collection::Transactions]);
        info!(user_id = %user_id, amount, "kopeki sold");
        Ok(balance)
    }

    /// Pays the award's cost from the sender to the receiver and records the
    /// award, both ledger entries, and a notification to the receiver.
    pub fn give_award(
        &mut self,
        session: &Session,
        entity_id: Uuid,
        entity_type: AwardTarget,
        award_id: &str,
        receiver_id: Uuid,
    ) -> Result<&Award> {
        let sender = self.require_user(session)?;
        let sender_id = sender.id;
        let sender_name = sender.username.clone();
        let award = award_type(award_id).ok_or(DomainError::InvalidAward)?;
        if self.user(receiver_id).is_none() {
            return Err(DomainError::UserNotFound);
        }
        if receiver_id == sender_id {
            return Err(DomainError::validation("you cannot award your own content"));
        }
        let exists = match entity_type {
            AwardTarget::Post => self.post(entity_id).is_some(),
            AwardTarget::Comment => self.comment(entity_id).is_some(),
        };
        if !exists {
            return Err(DomainError::not_found("entity", entity_id));
        }

        self.transfer(
            sender_id,
            receiver_id,
            award.cost,
            (
                Transaction::new(
                    sender_id,
                    TransactionType::AwardGiven,
                    award.cost,
                    format!("Gave {} award", award.label),
                ),
                Transaction::new(
                    receiver_id,
                    TransactionType::AwardReceived,
                    award.cost,
                    format!("Received {} award", award.label),
                ),
            ),
        )?;
        let record = Award {
            id: Uuid::new_v4(),
            type_id: award.id.to_string(),
            sender_id,
            receiver_id,
            entity_id,
            entity_type,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.data.awards.push(record);
        self.data.messages.push(Message::notification(
            sender_id,
            receiver_id,
            format!("{sender_name} gave you a {} award (+{} Kopeki)", award.label, award.cost),
        ));
        self.persist(&[
            Collection::Users,
            Collection::Awards,
            Collection::Transactions,
            Collection::Messages,
        ]);

        info!(award = award.id, sender = %sender_id, receiver = %receiver_id, "award given");
        self.data
            .awards
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| DomainError::not_found("award", id))
    }

    /// Awards on an entity grouped by type, most expensive first.
    pub fn awards_for_entity(&self, entity_id: Uuid) -> Vec<AwardTally> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for award in self.data.awards.iter().filter(|a| a.entity_id == entity_id) {
            *counts.entry(award.type_id.as_str()).or_default() += 1;
        }
        let mut tallies: Vec<AwardTally> = counts
            .into_iter()
            .filter_map(|(id, count)| award_type(id).map(|award| AwardTally { award, count }))
            .collect();
        tallies.sort_by(|a, b| b.award.cost.cmp(&a.award.cost));
        tallies
    }

    /// Pays for a paid profile post once. A second unlock by the same viewer
    /// charges nothing.
    pub fn unlock_profile_post(&mut self, session: &Session, post_id: Uuid) -> Result<UnlockOutcome> {
        let viewer = self.require_user(session)?;
        let viewer_id = viewer.id;
        let viewer_name = viewer.username.clone();
        let post = self.find_profile_post(post_id)?;
        if post.author_id == viewer_id {
            return Err(DomainError::validation("you cannot unlock your own post"));
        }
        if !post.is_paid() {
            return Err(DomainError::validation("this post is free"));
        }
        if post.unlocked_user_ids.contains(&viewer_id) {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let (author_id, price, title) = (post.author_id, post.price, post.title.clone());
        self.transfer(
            viewer_id,
            author_id,
            price,
            (
                Transaction::new(viewer_id, TransactionType::PostUnlock, price, format!("Unlocked \"{title}\"")),
                Transaction::new(
                    author_id,
                    TransactionType::PostIncome,
                    price,
                    format!("{viewer_name} unlocked \"{title}\""),
                ),
            ),
        )?;
        if let Some(post) = self.data.profile_posts.iter_mut().find(|p| p.id == post_id) {
            post.unlocked_user_ids.push(viewer_id);
        }
        self.data.messages.push(Message::notification(
            viewer_id,
            author_id,
            format!("{viewer_name} unlocked your post \"{title}\" (+{price} Kopeki)"),
        ));
        self.persist(&[
            Collection::Users,
            Collection::ProfilePosts,
            Collection::Transactions,
            Collection::Messages,
        ]);

        info!(post_id = %post_id, viewer = %viewer_id, price, "profile post unlocked");
        Ok(UnlockOutcome::Unlocked)
    }

    /// A user's ledger, newest first.
    pub fn transactions_for(&self, user_id: Uuid) -> Vec<&Transaction> {
        let mut entries: Vec<&Transaction> = self
            .data
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{empty_store, sign_up};
    use domains::{cheapest_award, MessageType, NewBoard, NewPost, NewProfilePost, AWARD_CATALOG};

    async fn post_by(store: &mut Store, author: &Session) -> Uuid {
        let board_id = store.create_board(author, NewBoard::open("b", "")).unwrap().id;
        store
            .create_post(
                author,
                NewPost {
                    board_id,
                    title: "p".into(),
                    ..NewPost::default()
                },
            )
            .unwrap()
            .id
    }

    fn set_balance(store: &mut Store, user_id: Uuid, kopeki: u64) {
        store.user_mut(user_id).unwrap().kopeki = kopeki;
    }

    #[tokio::test]
    async fn buying_and_selling_adjust_balance_and_ledger() {
        let mut store = empty_store().await;
        let session = sign_up(&mut store, "trader");
        let id = session.current_user().unwrap();

        assert_eq!(store.buy_kopeki(&session, 20_000).unwrap(), 21_000);
        assert_eq!(store.sell_kopeki(&session, 1_000).unwrap(), 20_000);
        assert_eq!(
            store.sell_kopeki(&session, 50_000).unwrap_err(),
            DomainError::InsufficientKopeki {
                needed: 50_000,
                available: 20_000
            }
        );

        let ledger = store.transactions_for(id);
        assert_eq!(ledger.len(), 2);
        let buy = ledger.iter().find(|t| t.kind == TransactionType::Buy).unwrap();
        assert_eq!(buy.currency_amount, Some(2.0));
    }

    #[tokio::test]
    async fn credits_that_would_overflow_change_nothing() {
        let mut store = empty_store().await;
        let buyer = sign_up(&mut store, "buyer");
        let buyer_id = buyer.current_user().unwrap();
        assert_eq!(
            store.buy_kopeki(&buyer, u64::MAX).unwrap_err(),
            DomainError::validation("balance limit exceeded")
        );
        assert_eq!(store.user(buyer_id).unwrap().kopeki, 1000);

        let giver = sign_up(&mut store, "giver");
        let giver_id = giver.current_user().unwrap();
        let post_id = post_by(&mut store, &buyer).await;
        set_balance(&mut store, buyer_id, u64::MAX - 50);
        assert!(matches!(
            store.give_award(&giver, post_id, AwardTarget::Post, "silver", buyer_id),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(store.user(giver_id).unwrap().kopeki, 1000);
        assert_eq!(store.user(buyer_id).unwrap().kopeki, u64::MAX - 50);
        assert!(store.collections().awards.is_empty());
        assert!(store.collections().transactions.is_empty());
    }

    #[tokio::test]
    async fn cheapest_award_moves_exactly_its_cost() {
        let mut store = empty_store().await;
        let giver = sign_up(&mut store, "giver");
        let receiver = sign_up(&mut store, "receiver");
        let (giver_id, receiver_id) = (giver.current_user().unwrap(), receiver.current_user().unwrap());
        let post_id = post_by(&mut store, &receiver).await;
        set_balance(&mut store, receiver_id, 0);

        store
            .give_award(&giver, post_id, AwardTarget::Post, cheapest_award().id, receiver_id)
            .unwrap();
        assert_eq!(store.user(giver_id).unwrap().kopeki, 900);
        assert_eq!(store.user(receiver_id).unwrap().kopeki, 100);
        assert_eq!(store.collections().awards.len(), 1);
        assert_eq!(store.collections().transactions.len(), 2);

        let note = store
            .collections()
            .messages
            .iter()
            .find(|m| m.recipient_id == receiver_id)
            .unwrap();
        assert_eq!(note.kind, MessageType::Notification);
    }

    #[tokio::test]
    async fn every_award_is_affordable_at_exact_cost_and_not_below() {
        let mut store = empty_store().await;
        let giver = sign_up(&mut store, "giver");
        let receiver = sign_up(&mut store, "receiver");
        let (giver_id, receiver_id) = (giver.current_user().unwrap(), receiver.current_user().unwrap());
        let post_id = post_by(&mut store, &receiver).await;

        for award in AWARD_CATALOG.iter() {
            set_balance(&mut store, giver_id, award.cost - 1);
            set_balance(&mut store, receiver_id, 0);
            assert!(matches!(
                store.give_award(&giver, post_id, AwardTarget::Post, award.id, receiver_id),
                Err(DomainError::InsufficientKopeki { .. })
            ));
            assert_eq!(store.user(giver_id).unwrap().kopeki, award.cost - 1);
            assert_eq!(store.user(receiver_id).unwrap().kopeki, 0);

            set_balance(&mut store, giver_id, award.cost);
            store
                .give_award(&giver, post_id, AwardTarget::Post, award.id, receiver_id)
                .unwrap();
            assert_eq!(store.user(giver_id).unwrap().kopeki, 0);
            assert_eq!(store.user(receiver_id).unwrap().kopeki, award.cost);
        }
        assert_eq!(store.collections().awards.len(), AWARD_CATALOG.len());
    }

    #[tokio::test]
    async fn award_failures_leave_state_untouched() {
        let mut store = empty_store().await;
        let giver = sign_up(&mut store, "giver");
        let receiver = sign_up(&mut store, "receiver");
        let receiver_id = receiver.current_user().unwrap();
        let post_id = post_by(&mut store, &receiver).await;

        assert_eq!(
            store
                .give_award(&giver, post_id, AwardTarget::Post, "bronze", receiver_id)
                .unwrap_err(),
            DomainError::InvalidAward
        );
        assert_eq!(
            store
                .give_award(&giver, post_id, AwardTarget::Post, "silver", Uuid::new_v4())
                .unwrap_err(),
            DomainError::UserNotFound
        );
        assert!(store.collections().awards.is_empty());
        assert!(store.collections().transactions.is_empty());
    }

    #[tokio::test]
    async fn awards_are_grouped_by_type() {
        let mut store = empty_store().await;
        let giver = sign_up(&mut store, "giver");
        let receiver = sign_up(&mut store, "receiver");
        let receiver_id = receiver.current_user().unwrap();
        let post_id = post_by(&mut store, &receiver).await;

        for id in ["silver", "gold", "silver"] {
            store
                .give_award(&giver, post_id, AwardTarget::Post, id, receiver_id)
                .unwrap();
        }
        let tallies = store.awards_for_entity(post_id);
        assert_eq!(tallies.len(), 2);
        assert_eq!((tallies[0].award.id, tallies[0].count), ("gold", 1));
        assert_eq!((tallies[1].award.id, tallies[1].count), ("silver", 2));
    }

    #[tokio::test]
    async fn profile_post_unlock_charges_once() {
        let mut store = empty_store().await;
        let author = sign_up(&mut store, "author");
        let viewer = sign_up(&mut store, "viewer");
        let (author_id, viewer_id) = (author.current_user().unwrap(), viewer.current_user().unwrap());
        let post_id = store
            .create_profile_post(
                &author,
                NewProfilePost {
                    title: "premium".into(),
                    price: 400,
                    ..NewProfilePost::default()
                },
            )
            .unwrap()
            .id;

        assert_eq!(store.unlock_profile_post(&viewer, post_id).unwrap(), UnlockOutcome::Unlocked);
        assert_eq!(store.user(viewer_id).unwrap().kopeki, 600);
        assert_eq!(store.user(author_id).unwrap().kopeki, 1400);
        assert!(store.can_view_profile_post(post_id, &viewer));

        assert_eq!(
            store.unlock_profile_post(&viewer, post_id).unwrap(),
            UnlockOutcome::AlreadyUnlocked
        );
        assert_eq!(store.user(viewer_id).unwrap().kopeki, 600);
        let unlocked = &store.profile_post(post_id).unwrap().unlocked_user_ids;
        assert_eq!(unlocked, &vec![viewer_id]);
    }

    #[tokio::test]
    async fn profile_post_unlock_rejections() {
        let mut store = empty_store().await;
        let author = sign_up(&mut store, "author");
        let viewer = sign_up(&mut store, "viewer");
        let viewer_id = viewer.current_user().unwrap();
        let paid = store
            .create_profile_post(
                &author,
                NewProfilePost {
                    title: "premium".into(),
                    price: 400,
                    ..NewProfilePost::default()
                },
            )
            .unwrap()
            .id;
        let free = store
            .create_profile_post(
                &author,
                NewProfilePost {
                    title: "free".into(),
                    ..NewProfilePost::default()
                },
            )
            .unwrap()
            .id;

        assert!(matches!(
            store.unlock_profile_post(&author, paid),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            store.unlock_profile_post(&viewer, free),
            Err(DomainError::Validation(_))
        ));
        set_balance(&mut store, viewer_id, 399);
        assert_eq!(
            store.unlock_profile_post(&viewer, paid).unwrap_err(),
            DomainError::InsufficientKopeki {
                needed: 400,
                available: 399
            }
        );
        assert!(store.profile_post(paid).unwrap().unlocked_user_ids.is_empty());
    }
}
