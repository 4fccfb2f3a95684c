//! Accounts: login, registration, profile, verification, saved payment
//! details, and junk-sender lists.

use domains::{
    DomainError, NewCard, ProfilePatch, Result, Role, SavedCard, SavedIban, Session, User,
    Verification,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{require_text, Store};
use crate::persistence::Collection;

const MAX_USERNAME_LEN: usize = 32;

impl Store {
    /// Logs `session` in on a matching username and password.
    pub fn authenticate(
        &mut self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<&User> {
        let user = self
            .user_by_username(username)
            .ok_or(DomainError::InvalidCredentials)?;
        if !self.hasher.verify(password, &user.password_hash) {
            warn!(username, "failed login attempt");
            return Err(DomainError::InvalidCredentials);
        }
        let id = user.id;

        session.log_in(id);
        self.persist_current_user(Some(id));
        info!(user_id = %id, "user logged in");
        self.find_user(id)
    }

    /// Creates an account with the starting balance and logs it in.
    pub fn register(&mut self, session: &mut Session, username: &str, password: &str) -> Result<&User> {
        let username = require_text(username, "username")?;
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        if self.user_by_username(&username).is_some() {
            return Err(DomainError::UsernameTaken);
        }

        let user = User::new(username, self.hash_password(password)?, self.options.starting_balance);
        let id = user.id;
        self.data.users.push(user);
        session.log_in(id);
        let current = self.current_user_entry(Some(id));
        self.persist_with(&[Collection::Users], current);
        info!(user_id = %id, "user registered");
        self.find_user(id)
    }

    pub fn logout(&mut self, session: &mut Session) {
        session.log_out();
        self.persist_current_user(None);
    }

    pub fn change_password(&mut self, session: &Session, old: &str, new: &str) -> Result<()> {
        let user = self.require_user(session)?;
        if !self.hasher.verify(old, &user.password_hash) {
            return Err(DomainError::InvalidCredentials);
        }
        if new.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        let id = user.id;
        let hash = self.hash_password(new)?;
        self.user_mut(id)?.password_hash = hash;
        self.persist(&[Collection::Users]);
        info!(user_id = %id, "password changed");
        Ok(())
    }

    pub fn update_profile(&mut self, session: &Session, patch: ProfilePatch) -> Result<&User> {
        let id = self.require_user(session)?.id;
        if let Some(Some(code)) = &patch.country_code {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(DomainError::validation("country code must be two letters"));
            }
        }

        let user = self.user_mut(id)?;
        if let Some(bio) = patch.bio {
            user.bio = Some(bio);
        }
        if let Some(icon_url) = patch.icon_url {
            user.icon_url = icon_url;
        }
        if let Some(banner_url) = patch.banner_url {
            user.banner_url = banner_url;
        }
        if let Some(code) = patch.country_code {
            user.country_code = code.map(|c| c.to_ascii_uppercase());
        }
        if let Some(public_key) = patch.public_key {
            user.public_key = public_key.filter(|k| !k.trim().is_empty());
        }
        self.persist(&[Collection::Users]);
        self.find_user(id)
    }

    /// `unverified → pending`.
    pub fn request_verification(&mut self, session: &Session) -> Result<()> {
        let user = self.require_user(session)?;
        match user.verification() {
            Verification::Verified => return Err(DomainError::validation("already verified")),
            Verification::Pending => return Ok(()),
            Verification::Unverified => {}
        }
        let id = user.id;
        self.user_mut(id)?.is_pending_verification = true;
        self.persist(&[Collection::Users]);
        Ok(())
    }

    /// `pending → verified` on approval, `pending → unverified` otherwise.
    pub fn review_verification(&mut self, session: &Session, user_id: Uuid, approve: bool) -> Result<()> {
        self.require_site_admin(session)?;
        let user = self.user_mut(user_id)?;
        if user.verification() != Verification::Pending {
            return Err(DomainError::validation("no pending verification request"));
        }
        user.is_pending_verification = false;
        user.is_verified = approve;
        self.persist(&[Collection::Users]);
        info!(user_id = %user_id, approve, "verification reviewed");
        Ok(())
    }

    /// Stores card metadata returned by the payment widget.
    pub fn add_credit_card(&mut self, session: &Session, card: NewCard) -> Result<SavedCard> {
        let id = self.require_user(session)?.id;
        if card.last4.len() != 4 || !card.last4.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation("last4 must be four digits"));
        }
        if !is_expiry(&card.expiry) {
            return Err(DomainError::validation("expiry must be MM/YY"));
        }
        let saved = SavedCard {
            id: Uuid::new_v4(),
            brand: require_text(&card.brand, "card brand")?,
            last4: card.last4,
            holder_name: require_text(&card.holder_name, "card holder")?,
            expiry: card.expiry,
        };
        self.user_mut(id)?.saved_cards.push(saved.clone());
        self.persist(&[Collection::Users]);
        Ok(saved)
    }

    pub fn remove_credit_card(&mut self, session: &Session, card_id: Uuid) -> Result<()> {
        let id = self.require_user(session)?.id;
        let cards = &mut self.user_mut(id)?.saved_cards;
        let before = cards.len();
        cards.retain(|c| c.id != card_id);
        if cards.len() == before {
            return Err(DomainError::not_found("card", card_id));
        }
        self.persist(&[Collection::Users]);
        Ok(())
    }

    pub fn add_iban(&mut self, session: &Session, iban: &str, holder_name: &str) -> Result<SavedIban> {
        let id = self.require_user(session)?.id;
        let iban = normalize_iban(iban)?;
        let saved = SavedIban {
            id: Uuid::new_v4(),
            iban,
            holder_name: require_text(holder_name, "account holder")?,
        };
        self.user_mut(id)?.saved_ibans.push(saved.clone());
        self.persist(&[Collection::Users]);
        Ok(saved)
    }

    pub fn remove_iban(&mut self, session: &Session, iban_id: Uuid) -> Result<()> {
        let id = self.require_user(session)?.id;
        let ibans = &mut self.user_mut(id)?.saved_ibans;
        let before = ibans.len();
        ibans.retain(|i| i.id != iban_id);
        if ibans.len() == before {
            return Err(DomainError::not_found("iban", iban_id));
        }
        self.persist(&[Collection::Users]);
        Ok(())
    }

    /// Routes future messages from `sender_id` to the junk folder.
    pub fn mark_as_junk(&mut self, session: &Session, sender_id: Uuid) -> Result<()> {
        let id = self.require_user(session)?.id;
        if sender_id == id {
            return Err(DomainError::validation("you cannot mark yourself as junk"));
        }
        self.find_user(sender_id)?;
        let junk = &mut self.user_mut(id)?.junk_senders;
        if !junk.contains(&sender_id) {
            junk.push(sender_id);
            self.persist(&[Collection::Users]);
        }
        Ok(())
    }

    pub fn unmark_junk(&mut self, session: &Session, sender_id: Uuid) -> Result<()> {
        let id = self.require_user(session)?.id;
        let junk = &mut self.user_mut(id)?.junk_senders;
        let before = junk.len();
        junk.retain(|s| *s != sender_id);
        if junk.len() != before {
            self.persist(&[Collection::Users]);
        }
        Ok(())
    }

    /// Operator bootstrap: creates `username` as a site admin, or promotes and
    /// resets the password of an existing account. Needs no session.
    pub fn provision_admin(&mut self, username: &str, password: &str) -> Result<&User> {
        let username = require_text(username, "username")?;
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        let hash = self.hash_password(password)?;

        let existing = self.user_by_username(&username).map(|u| u.id);
        let id = match existing {
            Some(id) => {
                let user = self.user_mut(id)?;
                user.role = Role::Admin;
                user.password_hash = hash;
                id
            }
            None => {
                let mut user = User::new(username, hash, self.options.starting_balance);
                user.role = Role::Admin;
                let id = user.id;
                self.data.users.push(user);
                id
            }
        };
        self.persist(&[Collection::Users]);
        info!(user_id = %id, "site admin provisioned");
        self.find_user(id)
    }
}

fn is_expiry(value: &str) -> bool {
    let Some((month, year)) = value.split_once('/') else {
        return false;
    };
    let month_ok = month.len() == 2 && matches!(month.parse::<u8>(), Ok(1..=12));
    let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}

/// Strips spaces, upper-cases, and checks the IBAN shape (country code,
/// check digits, 11 to 30 alphanumerics).
fn normalize_iban(raw: &str) -> Result<String> {
    let iban: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let bytes = iban.as_bytes();
    let shape_ok = (15..=34).contains(&iban.len())
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_alphanumeric);
    if !shape_ok {
        return Err(DomainError::validation("malformed IBAN"));
    }
    Ok(iban)
}
