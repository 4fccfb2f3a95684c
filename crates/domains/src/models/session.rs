//! # Session
//!
//! Per-viewer state that the store consults but does not own: who is logged in,
//! which anonymous id votes are cast under, and which password boards were
//! unlocked. Passing it explicitly lets several sessions share one store.

use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<Uuid>,
    anonymous_id: Option<Uuid>,
    /// Never persisted; a reload re-locks every password board
    unlocked_boards: HashSet<Uuid>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            current_user: Some(user_id),
            ..Self::default()
        }
    }

    pub fn resumed(current_user: Option<Uuid>, anonymous_id: Option<Uuid>) -> Self {
        Self {
            current_user,
            anonymous_id,
            unlocked_boards: HashSet::new(),
        }
    }

    pub fn current_user(&self) -> Option<Uuid> {
        self.current_user
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn anonymous_id(&self) -> Option<Uuid> {
        self.anonymous_id
    }

    /// The logged-in user, falling back to the anonymous id if one exists.
    pub fn actor(&self) -> Option<Uuid> {
        self.current_user.or(self.anonymous_id)
    }

    pub fn log_in(&mut self, user_id: Uuid) {
        self.current_user = Some(user_id);
    }

    pub fn log_out(&mut self) {
        self.current_user = None;
        self.unlocked_boards.clear();
    }

    pub fn set_anonymous_id(&mut self, id: Uuid) {
        self.anonymous_id = Some(id);
    }

    pub fn unlock_board(&mut self, board_id: Uuid) {
        self.unlocked_boards.insert(board_id);
    }

    pub fn has_unlocked(&self, board_id: Uuid) -> bool {
        self.unlocked_boards.contains(&board_id)
    }
}
