use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::MediaItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    BoardInvite,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

/// State of a `board_invite` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMetadata {
    pub board_id: Uuid,
    pub board_name: String,
    pub status: InviteStatus,
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Mock-ciphered when `is_encrypted` is set
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub is_encrypted: bool,
    /// Kopeki transferred along with the message
    #[serde(default)]
    pub kopeki_amount: u64,
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    #[serde(default)]
    pub metadata: Option<InviteMetadata>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            content: content.into(),
            media: Vec::new(),
            is_encrypted: false,
            kopeki_amount: 0,
            kind: MessageType::Text,
            metadata: None,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    pub fn notification(sender_id: Uuid, recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Notification,
            ..Self::new(sender_id, recipient_id, content)
        }
    }

    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.recipient_id == b)
            || (self.sender_id == b && self.recipient_id == a)
    }

    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}
