use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A registered account and its wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Unique, compared case-insensitively
    pub username: String,
    /// Argon2 PHC string; the plaintext is never stored
    pub password_hash: String,
    pub role: Role,
    /// Kopeki balance; unsigned so it can never go negative
    pub kopeki: u64,
    #[serde(default)]
    pub saved_cards: Vec<SavedCard>,
    #[serde(default)]
    pub saved_ibans: Vec<SavedIban>,
    /// Senders whose messages land in the junk folder
    #[serde(default)]
    pub junk_senders: Vec<Uuid>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_pending_verification: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    /// When present, incoming messages are passed through the mock cipher
    #[serde(default)]
    pub public_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: String, kopeki: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            role: Role::User,
            kopeki,
            saved_cards: Vec::new(),
            saved_ibans: Vec::new(),
            junk_senders: Vec::new(),
            is_verified: false,
            is_pending_verification: false,
            bio: None,
            icon_url: None,
            banner_url: None,
            country_code: None,
            public_key: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_username(&self, username: &str) -> bool {
        super::same_name(&self.username, username)
    }

    pub fn verification(&self) -> Verification {
        match (self.is_verified, self.is_pending_verification) {
            (true, _) => Verification::Verified,
            (false, true) => Verification::Pending,
            (false, false) => Verification::Unverified,
        }
    }
}

/// Derived view over the `isVerified` / `isPendingVerification` flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Unverified,
    Pending,
    Verified,
}

/// Card metadata handed over by the payment widget. No PAN is ever stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCard {
    pub id: Uuid,
    pub brand: String,
    pub last4: String,
    pub holder_name: String,
    /// `MM/YY`
    pub expiry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedIban {
    pub id: Uuid,
    pub iban: String,
    pub holder_name: String,
}
