use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named community section with its own access policy and moderation roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    /// Unique, compared case-insensitively
    pub name: String,
    pub description: String,
    pub creator_id: Uuid,
    /// Always contains the creator
    pub admin_ids: Vec<Uuid>,
    #[serde(default)]
    pub moderator_ids: Vec<Uuid>,
    pub allow_anonymous_posts: bool,
    pub allow_anonymous_comments: bool,
    /// Argon2 PHC string of the board password, if the board is password-protected
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub is_invite_only: bool,
    /// Members of invite-only or paid boards
    #[serde(default)]
    pub allowed_user_ids: Vec<Uuid>,
    #[serde(default)]
    pub entry_fee: u64,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn has_name(&self, name: &str) -> bool {
        super::same_name(&self.name, name)
    }

    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn is_moderator(&self, user_id: Uuid) -> bool {
        self.moderator_ids.contains(&user_id)
    }

    /// Board admins and moderators.
    pub fn is_staff(&self, user_id: Uuid) -> bool {
        self.is_admin(user_id) || self.is_moderator(user_id)
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Invite-only and paid boards gate access on `allowed_user_ids`.
    pub fn requires_membership(&self) -> bool {
        self.is_invite_only || self.entry_fee > 0
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.allowed_user_ids.contains(&user_id)
    }
}
