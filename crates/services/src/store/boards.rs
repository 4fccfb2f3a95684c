//! Boards: creation, settings, moderation roles, invites, subscriptions, and
//! the derived access policy.

use chrono::Utc;
use domains::{
    Board, BoardPatch, DomainError, InviteMetadata, InviteResponse, InviteStatus, Message,
    MessageType, NewBoard, Result, Session, Subscription, Transaction, TransactionType,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{require_text, Store};
use crate::persistence::Collection;

impl Store {
    pub fn board_by_name(&self, name: &str) -> Option<&Board> {
        self.data.boards.iter().find(|b| b.has_name(name))
    }

    /// Creates a board. The creator becomes its sole admin and is subscribed.
    pub fn create_board(&mut self, session: &Session, new: NewBoard) -> Result<&Board> {
        let creator = self.require_user(session)?.id;
        let name = require_text(&new.name, "board name")?;
        if self.board_by_name(&name).is_some() {
            return Err(DomainError::BoardNameTaken);
        }
        let password_hash = match new.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };
        let allowed_user_ids = if new.invite_only || new.entry_fee > 0 {
            vec![creator]
        } else {
            Vec::new()
        };

        let board = Board {
            id: Uuid::new_v4(),
            name,
            description: new.description.trim().to_string(),
            creator_id: creator,
            admin_ids: vec![creator],
            moderator_ids: Vec::new(),
            allow_anonymous_posts: new.allow_anonymous_posts,
            allow_anonymous_comments: new.allow_anonymous_comments,
            password_hash,
            is_invite_only: new.invite_only,
            allowed_user_ids,
            entry_fee: new.entry_fee,
            icon_url: new.icon_url,
            banner_url: new.banner_url,
            created_at: Utc::now(),
        };
        let id = board.id;
        self.data.boards.push(board);
        self.add_subscription(creator, id);
        self.persist(&[Collection::Boards, Collection::Subscriptions]);

        info!(board_id = %id, creator = %creator, "board created");
        self.find_board(id)
    }

    /// Applies a settings patch. Board admins and site admins only.
    pub fn update_board(&mut self, session: &Session, board_id: Uuid, patch: BoardPatch) -> Result<&Board> {
        self.require_board_admin(session, board_id)?;

        let name = match &patch.name {
            Some(name) => {
                let name = require_text(name, "board name")?;
                if self
                    .data
                    .boards
                    .iter()
                    .any(|b| b.id != board_id && b.has_name(&name))
                {
                    return Err(DomainError::BoardNameTaken);
                }
                Some(name)
            }
            None => None,
        };
        let password_hash = match &patch.password {
            Some(Some(password)) if !password.is_empty() => Some(Some(self.hash_password(password)?)),
            Some(_) => Some(None),
            None => None,
        };

        let board = self.board_mut(board_id)?;
        if let Some(name) = name {
            board.name = name;
        }
        if let Some(description) = patch.description {
            board.description = description.trim().to_string();
        }
        if let Some(allow) = patch.allow_anonymous_posts {
            board.allow_anonymous_posts = allow;
        }
        if let Some(allow) = patch.allow_anonymous_comments {
            board.allow_anonymous_comments = allow;
        }
        if let Some(hash) = password_hash {
            board.password_hash = hash;
        }
        if let Some(invite_only) = patch.is_invite_only {
            board.is_invite_only = invite_only;
        }
        if let Some(fee) = patch.entry_fee {
            board.entry_fee = fee;
        }
        if let Some(icon_url) = patch.icon_url {
            board.icon_url = icon_url;
        }
        if let Some(banner_url) = patch.banner_url {
            board.banner_url = banner_url;
        }
        // Turning a board private must not lock out its creator.
        if board.requires_membership() && !board.is_member(board.creator_id) {
            let creator = board.creator_id;
            board.allowed_user_ids.push(creator);
        }

        self.persist(&[Collection::Boards]);
        self.find_board(board_id)
    }

    pub fn appoint_moderator(&mut self, session: &Session, board_id: Uuid, username: &str) -> Result<()> {
        self.require_board_admin(session, board_id)?;
        let target = self.user_by_username(username).ok_or(DomainError::UserNotFound)?.id;
        let board = self.board_mut(board_id)?;
        if board.is_moderator(target) {
            return Ok(());
        }
        board.moderator_ids.push(target);
        self.persist(&[Collection::Boards]);
        info!(board_id = %board_id, user_id = %target, "moderator appointed");
        Ok(())
    }

    pub fn appoint_admin(&mut self, session: &Session, board_id: Uuid, username: &str) -> Result<()> {
        self.require_board_admin(session, board_id)?;
        let target = self.user_by_username(username).ok_or(DomainError::UserNotFound)?.id;
        let board = self.board_mut(board_id)?;
        if board.is_admin(target) {
            return Ok(());
        }
        board.admin_ids.push(target);
        self.persist(&[Collection::Boards]);
        info!(board_id = %board_id, user_id = %target, "board admin appointed");
        Ok(())
    }

    pub fn remove_moderator(&mut self, session: &Session, board_id: Uuid, user_id: Uuid) -> Result<()> {
        self.require_board_admin(session, board_id)?;
        let board = self.board_mut(board_id)?;
        board.moderator_ids.retain(|id| *id != user_id);
        self.persist(&[Collection::Boards]);
        Ok(())
    }

    /// The creator always stays an admin.
    pub fn remove_admin(&mut self, session: &Session, board_id: Uuid, user_id: Uuid) -> Result<()> {
        self.require_board_admin(session, board_id)?;
        let board = self.board_mut(board_id)?;
        if board.creator_id == user_id {
            return Err(DomainError::forbidden("the board creator cannot be removed"));
        }
        board.admin_ids.retain(|id| *id != user_id);
        self.persist(&[Collection::Boards]);
        Ok(())
    }

    /// Sends a pending `board_invite` message. Access is granted only when the
    /// invite is accepted.
    pub fn invite_user_to_board(&mut self, session: &Session, board_id: Uuid, username: &str) -> Result<&Message> {
        let inviter = self.require_board_admin(session, board_id)?;
        let target = self.user_by_username(username).ok_or(DomainError::UserNotFound)?.id;
        let board = self.find_board(board_id)?;
        if board.is_member(target) || board.is_staff(target) {
            return Err(DomainError::validation("user already has access to this board"));
        }

        let mut message = Message::new(
            inviter,
            target,
            format!("You have been invited to join {}", board.name),
        );
        message.kind = MessageType::BoardInvite;
        message.metadata = Some(InviteMetadata {
            board_id,
            board_name: board.name.clone(),
            status: InviteStatus::Pending,
        });
        let id = message.id;
        self.data.messages.push(message);
        self.persist(&[Collection::Messages]);
        self.find_message(id)
    }

    /// Resolves a pending invite. Each invite can be answered once.
    pub fn respond_to_board_invite(
        &mut self,
        session: &Session,
        message_id: Uuid,
        response: InviteResponse,
    ) -> Result<()> {
        let user_id = self.require_user(session)?.id;
        let message = self.find_message(message_id)?;
        if message.recipient_id != user_id {
            return Err(DomainError::forbidden("this invite is not addressed to you"));
        }
        let metadata = match (message.kind, &message.metadata) {
            (MessageType::BoardInvite, Some(metadata)) => metadata.clone(),
            _ => return Err(DomainError::validation("not a board invite")),
        };
        if metadata.status != InviteStatus::Pending {
            return Err(DomainError::InviteAlreadyResolved);
        }

        let mut touched = vec![Collection::Messages];
        let status = match response {
            InviteResponse::Accept => {
                let board = self.board_mut(metadata.board_id)?;
                if !board.is_member(user_id) {
                    board.allowed_user_ids.push(user_id);
                }
                touched.push(Collection::Boards);
                InviteStatus::Accepted
            }
            InviteResponse::Reject => InviteStatus::Rejected,
        };

        if let Some(message) = self.data.messages.iter_mut().find(|m| m.id == message_id) {
            if let Some(metadata) = message.metadata.as_mut() {
                metadata.status = status;
            }
            message.read_at.get_or_insert_with(Utc::now);
        }
        self.persist(&touched);
        info!(board_id = %metadata.board_id, user_id = %user_id, ?status, "board invite answered");
        Ok(())
    }

    /// Idempotent: subscribing twice keeps a single subscription.
    pub fn subscribe(&mut self, session: &Session, board_id: Uuid) -> Result<()> {
        let user_id = self.require_user(session)?.id;
        self.find_board(board_id)?;
        if self.add_subscription(user_id, board_id) {
            self.persist(&[Collection::Subscriptions]);
        }
        Ok(())
    }

    /// Idempotent: unsubscribing from a board you do not follow is a no-op.
    pub fn unsubscribe(&mut self, session: &Session, board_id: Uuid) -> Result<()> {
        let user_id = self.require_user(session)?.id;
        let before = self.data.subscriptions.len();
        self.data
            .subscriptions
            .retain(|s| !(s.user_id == user_id && s.board_id == board_id));
        if self.data.subscriptions.len() != before {
            self.persist(&[Collection::Subscriptions]);
        }
        Ok(())
    }

    pub fn is_subscribed(&self, user_id: Uuid, board_id: Uuid) -> bool {
        self.data
            .subscriptions
            .iter()
            .any(|s| s.user_id == user_id && s.board_id == board_id)
    }

    pub fn subscribed_boards(&self, user_id: Uuid) -> Vec<&Board> {
        self.data
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| self.board(s.board_id))
            .collect()
    }

    pub fn subscriber_count(&self, board_id: Uuid) -> usize {
        self.data
            .subscriptions
            .iter()
            .filter(|s| s.board_id == board_id)
            .count()
    }

    /// Unlocks a password board for this session only. Boards without a
    /// password are always open.
    pub fn unlock_board(&self, session: &mut Session, board_id: Uuid, password: &str) -> bool {
        let Some(board) = self.board(board_id) else {
            return false;
        };
        let Some(hash) = &board.password_hash else {
            return true;
        };
        if self.hasher.verify(password, hash) {
            session.unlock_board(board_id);
            true
        } else {
            debug!(board_id = %board_id, "wrong board password");
            false
        }
    }

    pub fn is_board_unlocked(&self, board_id: Uuid, session: &Session) -> bool {
        self.board(board_id)
            .is_some_and(|board| self.can_access(board, session))
    }

    /// Pays the entry fee of a paid board, granting membership. Paying again
    /// once a member is a no-op.
    pub fn pay_board_entry(&mut self, session: &Session, board_id: Uuid) -> Result<()> {
        let payer = self.require_user(session)?.id;
        let board = self.find_board(board_id)?;
        if board.entry_fee == 0 {
            return Err(DomainError::validation("this board has no entry fee"));
        }
        if board.is_member(payer) || board.is_staff(payer) {
            return Ok(());
        }
        if board.is_invite_only {
            return Err(DomainError::forbidden("this board is invite-only"));
        }

        let (fee, creator, name) = (board.entry_fee, board.creator_id, board.name.clone());
        self.transfer(
            payer,
            creator,
            fee,
            (
                Transaction::new(payer, TransactionType::BoardEntry, fee, format!("Entry fee for {name}")),
                Transaction::new(
                    creator,
                    TransactionType::BoardEntryIncome,
                    fee,
                    format!("Entry fee received for {name}"),
                ),
            ),
        )?;
        self.board_mut(board_id)?.allowed_user_ids.push(payer);
        self.persist(&[Collection::Users, Collection::Boards, Collection::Transactions]);
        info!(board_id = %board_id, user_id = %payer, fee, "board entry paid");
        Ok(())
    }

    // ── Policy helpers ──────────────────────────────────────────────────────

    /// Staff and site admins always get in; invite-only and paid boards need
    /// membership; password boards need a session unlock; the rest are open.
    pub(super) fn can_access(&self, board: &Board, session: &Session) -> bool {
        let viewer = session.current_user();
        if let Some(viewer) = viewer {
            if board.is_staff(viewer) || self.is_site_admin(viewer) {
                return true;
            }
        }
        if board.requires_membership() {
            return viewer.is_some_and(|v| board.is_member(v));
        }
        if board.is_password_protected() {
            return session.has_unlocked(board.id);
        }
        true
    }

    pub(super) fn ensure_access(&self, board_id: Uuid, session: &Session) -> Result<&Board> {
        let board = self.find_board(board_id)?;
        if !self.can_access(board, session) {
            return Err(DomainError::BoardLocked);
        }
        Ok(board)
    }

    /// Board admin or site admin; returns the caller's id.
    fn require_board_admin(&self, session: &Session, board_id: Uuid) -> Result<Uuid> {
        let user = self.require_user(session)?;
        let board = self.find_board(board_id)?;
        if board.is_admin(user.id) || user.is_admin() {
            Ok(user.id)
        } else {
            Err(DomainError::forbidden("board admins only"))
        }
    }

    /// Board admin, moderator, or site admin; returns the caller's id.
    pub(super) fn require_board_staff(&self, session: &Session, board_id: Uuid) -> Result<Uuid> {
        let user = self.require_user(session)?;
        let board = self.find_board(board_id)?;
        if board.is_staff(user.id) || user.is_admin() {
            Ok(user.id)
        } else {
            Err(DomainError::forbidden("board staff only"))
        }
    }

    fn add_subscription(&mut self, user_id: Uuid, board_id: Uuid) -> bool {
        if self.is_subscribed(user_id, board_id) {
            return false;
        }
        self.data.subscriptions.push(Subscription { user_id, board_id });
        true
    }
}
