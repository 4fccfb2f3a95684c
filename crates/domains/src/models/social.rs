use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn weight(self) -> i64 {
        match self {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }
}

/// One vote per (user, entity). `user_id` may be an anonymous voter id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: Uuid,
    pub entity_id: Uuid,
    #[serde(rename = "type")]
    pub kind: VoteType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: Uuid,
    pub board_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
}
