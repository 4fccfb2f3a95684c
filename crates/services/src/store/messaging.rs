//! Direct messages, conversations, and the junk folder.

use chrono::Utc;
use domains::{DomainError, Message, NewMessage, Result, Session};
use tracing::info;
use uuid::Uuid;

use super::{validate_media, Store};
use crate::cipher;
use crate::persistence::Collection;

impl Store {
    /// Sends a message. Content is sealed with the recipient's public key when
    /// one is published. `kopeki_amount` is recorded for display only; no
    /// balance changes hands.
    pub fn send_message(&mut self, session: &Session, new: NewMessage) -> Result<&Message> {
        let sender_id = self.require_user(session)?.id;
        if new.recipient_id == sender_id {
            return Err(DomainError::validation("you cannot message yourself"));
        }
        let public_key = self.find_user(new.recipient_id)?.public_key.clone();
        if new.content.trim().is_empty() && new.media.is_empty() && new.kopeki_amount == 0 {
            return Err(DomainError::validation("message cannot be empty"));
        }
        validate_media(&new.media)?;

        let mut message = Message::new(sender_id, new.recipient_id, new.content);
        if let Some(key) = public_key {
            message.content = cipher::seal(&message.content, &key);
            message.is_encrypted = true;
        }
        message.media = new.media;
        message.kopeki_amount = new.kopeki_amount;
        let id = message.id;
        self.data.messages.push(message);
        self.persist(&[Collection::Messages]);

        info!(message_id = %id, kopeki = new.kopeki_amount, "message sent");
        self.find_message(id)
    }

    /// Readable text of a message for one of its two participants.
    pub fn reveal_content(&self, session: &Session, message_id: Uuid) -> Result<String> {
        let viewer = self.require_user(session)?.id;
        let message = self.find_message(message_id)?;
        if message.sender_id != viewer && message.recipient_id != viewer {
            return Err(DomainError::forbidden("not a participant in this conversation"));
        }
        if !message.is_encrypted {
            return Ok(message.content.clone());
        }
        self.find_user(message.recipient_id)?
            .public_key
            .as_deref()
            .and_then(|key| cipher::open(&message.content, key))
            .ok_or_else(|| DomainError::validation("message can no longer be decrypted"))
    }

    /// Messages exchanged with `other`, oldest first.
    pub fn conversation(&self, session: &Session, other: Uuid) -> Result<Vec<&Message>> {
        let me = self.require_user(session)?.id;
        let mut messages: Vec<&Message> = self
            .data
            .messages
            .iter()
            .filter(|m| m.is_between(me, other))
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    /// Received messages from senders not marked as junk, newest first.
    pub fn inbox(&self, session: &Session) -> Result<Vec<&Message>> {
        self.received(session, false)
    }

    /// Received messages from senders marked as junk, newest first.
    pub fn junk_folder(&self, session: &Session) -> Result<Vec<&Message>> {
        self.received(session, true)
    }

    /// Marks every unread message from `other` as read; returns how many changed.
    pub fn mark_conversation_read(&mut self, session: &Session, other: Uuid) -> Result<usize> {
        let me = self.require_user(session)?.id;
        let now = Utc::now();
        let mut changed = 0;
        for message in self
            .data
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == other && m.recipient_id == me && m.is_unread())
        {
            message.read_at = Some(now);
            changed += 1;
        }
        if changed > 0 {
            self.persist(&[Collection::Messages]);
        }
        Ok(changed)
    }

    /// Unread messages in the inbox; junk is not counted.
    pub fn unread_count(&self, session: &Session) -> Result<usize> {
        Ok(self.inbox(session)?.into_iter().filter(|m| m.is_unread()).count())
    }

    fn received(&self, session: &Session, junk: bool) -> Result<Vec<&Message>> {
        let me = self.require_user(session)?;
        let mut messages: Vec<&Message> = self
            .data
            .messages
            .iter()
            .filter(|m| m.recipient_id == me.id && me.junk_senders.contains(&m.sender_id) == junk)
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}
