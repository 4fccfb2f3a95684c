//! Votes, karma, and follows.

use domains::{DomainError, Follow, Result, Session, User, Vote, VoteType};
use tracing::debug;
use uuid::Uuid;

use super::Store;
use crate::persistence::Collection;

impl Store {
    /// Casts a vote as the session's actor, minting an anonymous voter id if
    /// needed. Repeating the same vote withdraws it; the opposite vote
    /// replaces it. Returns the vote now in effect.
    pub fn cast_vote(&mut self, session: &mut Session, entity_id: Uuid, kind: VoteType) -> Result<Option<VoteType>> {
        if !self.is_votable(entity_id) {
            return Err(DomainError::not_found("entity", entity_id));
        }
        let (voter, minted) = self.actor_id(session);

        let existing = self
            .data
            .votes
            .iter()
            .position(|v| v.user_id == voter && v.entity_id == entity_id);
        let outcome = match existing {
            Some(index) if self.data.votes[index].kind == kind => {
                self.data.votes.remove(index);
                None
            }
            Some(index) => {
                self.data.votes[index].kind = kind;
                Some(kind)
            }
            None => {
                self.data.votes.push(Vote {
                    user_id: voter,
                    entity_id,
                    kind,
                });
                Some(kind)
            }
        };
        self.persist_with(&[Collection::Votes], minted);
        debug!(entity_id = %entity_id, ?outcome, "vote cast");
        Ok(outcome)
    }

    /// Upvotes minus downvotes.
    pub fn vote_score(&self, entity_id: Uuid) -> i64 {
        self.data
            .votes
            .iter()
            .filter(|v| v.entity_id == entity_id)
            .map(|v| v.kind.weight())
            .sum()
    }

    pub fn vote_of(&self, voter_id: Uuid, entity_id: Uuid) -> Option<VoteType> {
        self.data
            .votes
            .iter()
            .find(|v| v.user_id == voter_id && v.entity_id == entity_id)
            .map(|v| v.kind)
    }

    /// Net score across everything the user has authored: board posts,
    /// comments, and profile posts.
    pub fn user_karma(&self, user_id: Uuid) -> i64 {
        let authored = self
            .data
            .posts
            .iter()
            .filter(|p| p.author_id == Some(user_id))
            .map(|p| p.id)
            .chain(
                self.data
                    .comments
                    .iter()
                    .filter(|c| c.author_id == Some(user_id))
                    .map(|c| c.id),
            )
            .chain(
                self.data
                    .profile_posts
                    .iter()
                    .filter(|p| p.author_id == user_id)
                    .map(|p| p.id),
            );
        authored.map(|id| self.vote_score(id)).sum()
    }

    pub fn follow_user(&mut self, session: &Session, target: Uuid) -> Result<()> {
        let follower = self.require_user(session)?.id;
        if follower == target {
            return Err(DomainError::validation("you cannot follow yourself"));
        }
        self.find_user(target)?;
        if self.is_following(follower, target) {
            return Ok(());
        }
        self.data.follows.push(Follow {
            follower_id: follower,
            following_id: target,
        });
        self.persist(&[Collection::Follows]);
        Ok(())
    }

    pub fn unfollow_user(&mut self, session: &Session, target: Uuid) -> Result<()> {
        let follower = self.require_user(session)?.id;
        let before = self.data.follows.len();
        self.data
            .follows
            .retain(|f| !(f.follower_id == follower && f.following_id == target));
        if self.data.follows.len() != before {
            self.persist(&[Collection::Follows]);
        }
        Ok(())
    }

    pub fn is_following(&self, follower: Uuid, target: Uuid) -> bool {
        self.data
            .follows
            .iter()
            .any(|f| f.follower_id == follower && f.following_id == target)
    }

    pub fn followers_of(&self, user_id: Uuid) -> Vec<&User> {
        self.data
            .follows
            .iter()
            .filter(|f| f.following_id == user_id)
            .filter_map(|f| self.user(f.follower_id))
            .collect()
    }

    pub fn following_of(&self, user_id: Uuid) -> Vec<&User> {
        self.data
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| self.user(f.following_id))
            .collect()
    }

    fn is_votable(&self, entity_id: Uuid) -> bool {
        self.post(entity_id).is_some()
            || self.comment(entity_id).is_some()
            || self.profile_post(entity_id).is_some()
            || self.editorial(entity_id).is_some()
    }
}
