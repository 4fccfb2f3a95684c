//! # Commands and Patches
//!
//! Typed inputs for store operations. Patches enumerate exactly which fields a
//! caller may change; a `None` field is left untouched.

use uuid::Uuid;

use crate::models::{BillingModel, MediaItem};

#[derive(Debug, Clone, Default)]
pub struct NewBoard {
    pub name: String,
    pub description: String,
    pub allow_anonymous_comments: bool,
    pub allow_anonymous_posts: bool,
    pub password: Option<String>,
    pub invite_only: bool,
    pub entry_fee: u64,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
}

impl NewBoard {
    /// A public board with anonymous posting and commenting enabled.
    pub fn open(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            allow_anonymous_comments: true,
            allow_anonymous_posts: true,
            ..Self::default()
        }
    }
}

/// Changes a board admin (or site admin) may make to a board.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub allow_anonymous_posts: Option<bool>,
    pub allow_anonymous_comments: Option<bool>,
    /// `Some(None)` removes the password
    pub password: Option<Option<String>>,
    pub is_invite_only: Option<bool>,
    pub entry_fee: Option<u64>,
    pub icon_url: Option<Option<String>>,
    pub banner_url: Option<Option<String>>,
}

/// Changes a user may make to their own profile. Role, balance, and
/// verification are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub icon_url: Option<Option<String>>,
    pub banner_url: Option<Option<String>>,
    pub country_code: Option<Option<String>>,
    pub public_key: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub board_id: Uuid,
    pub title: String,
    pub content: String,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub media: Option<Vec<MediaItem>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProfilePost {
    pub title: String,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub price: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewEditorial {
    pub title: String,
    pub content: String,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub recipient_id: Uuid,
    pub content: String,
    pub media: Vec<MediaItem>,
    pub kopeki_amount: u64,
}

#[derive(Debug, Clone)]
pub struct NewAd {
    pub board_id: Uuid,
    pub title: String,
    pub content: String,
    pub link_url: String,
    pub image_url: Option<String>,
    pub budget: f64,
    pub model: BillingModel,
    pub bid_amount: f64,
}

/// Card metadata supplied by the payment widget on success.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub brand: String,
    pub last4: String,
    pub holder_name: String,
    pub expiry: String,
}

/// Answer to a `board_invite` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResponse {
    Accept,
    Reject,
}
