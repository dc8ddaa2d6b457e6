//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the generic `ChatProvider` interface used by the auction engine
//! and the specific implementation details of the Matrix SDK.
//!
//! Matrix has no "reaction delta" event: a reaction is an `m.reaction` annotation and removing it
//! is a redaction of that annotation. `ReactionLedger` remembers which annotation belongs to whom
//! so redactions can be turned back into deltas.

use crate::domain::traits::ChatProvider;
use crate::domain::types::{MemberProfile, ReactionDelta};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::Replacement;
use matrix_sdk::ruma::events::room::message::{
    Relation, RoomMessageEventContent, RoomMessageEventContentWithoutRelation,
};
use matrix_sdk::ruma::{EventId, RoomId, UserId};
use std::collections::HashMap;
use std::convert::TryFrom;

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
}

impl MatrixService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn room(&self, chat_id: &str) -> Result<Room> {
        let room_id = <&RoomId>::try_from(chat_id)?;
        self.client
            .get_room(room_id)
            .ok_or_else(|| anyhow!("Unknown room {chat_id}"))
    }

    async fn internal_send(&self, chat_id: &str, content: &str) -> Result<String> {
        let room = self.room(chat_id)?;
        let resp = room
            .send(RoomMessageEventContent::text_markdown(content))
            .await?;
        Ok(resp.event_id.to_string())
    }

    /// Helper to send markdown edits
    async fn internal_edit(&self, chat_id: &str, event_id: &str, new_content: &str) -> Result<()> {
        let room = self.room(chat_id)?;
        let event_id = <&EventId>::try_from(event_id)?;
        let mut content = RoomMessageEventContent::text_markdown(new_content);
        let replacement_content = RoomMessageEventContentWithoutRelation::from(content.clone());

        content.relates_to = Some(Relation::Replacement(Replacement::new(
            event_id.to_owned(),
            replacement_content,
        )));

        room.send(content).await?;
        Ok(())
    }

    async fn internal_redact(&self, chat_id: &str, event_id: &str) -> Result<()> {
        let room = self.room(chat_id)?;
        let event_id = <&EventId>::try_from(event_id)?;
        room.redact(event_id, None, None).await?;
        Ok(())
    }

    async fn internal_lookup(&self, chat_id: &str, user_id: &str) -> Result<MemberProfile> {
        let room = self.room(chat_id)?;
        let user = <&UserId>::try_from(user_id)?;
        let member = room
            .get_member(user)
            .await?
            .ok_or_else(|| anyhow!("{user_id} is not a member of {chat_id}"))?;
        Ok(MemberProfile {
            user_id: user_id.to_string(),
            handle: member.user_id().to_string(),
            display_name: member.name().to_string(),
        })
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    async fn send_message(&self, chat_id: &str, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", chat_id, content);
        self.internal_send(chat_id, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), String> {
        self.internal_edit(chat_id, message_id, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), String> {
        self.internal_redact(chat_id, message_id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn lookup_member(&self, chat_id: &str, user_id: &str) -> Result<MemberProfile, String> {
        self.internal_lookup(chat_id, user_id)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Profile derived from a bare user ID, used when the member lookup fails.
pub fn fallback_profile(user_id: &str) -> MemberProfile {
    let localpart = user_id
        .trim_start_matches('@')
        .split(':')
        .next()
        .unwrap_or(user_id);
    MemberProfile {
        user_id: user_id.to_string(),
        handle: user_id.to_string(),
        display_name: localpart.to_string(),
    }
}

#[derive(Debug, Clone)]
struct Annotation {
    chat_id: String,
    message_id: String,
    user_id: String,
    key: String,
}

/// Live reaction annotations seen since startup, keyed by annotation event ID.
#[derive(Debug, Default)]
pub struct ReactionLedger {
    annotations: HashMap<String, Annotation>,
}

impl ReactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an `m.reaction` and returns the delta it represents.
    pub fn on_reaction(
        &mut self,
        reaction_event_id: &str,
        chat_id: &str,
        message_id: &str,
        user_id: &str,
        key: &str,
    ) -> ReactionDelta {
        self.annotations.insert(
            reaction_event_id.to_string(),
            Annotation {
                chat_id: chat_id.to_string(),
                message_id: message_id.to_string(),
                user_id: user_id.to_string(),
                key: key.to_string(),
            },
        );
        ReactionDelta {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
            user: fallback_profile(user_id),
            added: vec![key.to_string()],
            removed: Vec::new(),
        }
    }

    /// Turns the redaction of a known annotation into a removal delta.
    ///
    /// The user's remaining reactions on the same message are reported as `added`,
    /// so someone who still reacts stays a participant.
    pub fn on_redaction(&mut self, redacted_event_id: &str) -> Option<ReactionDelta> {
        let removed = self.annotations.remove(redacted_event_id)?;
        let remaining: Vec<String> = self
            .annotations
            .values()
            .filter(|a| a.message_id == removed.message_id && a.user_id == removed.user_id)
            .map(|a| a.key.clone())
            .collect();

        Some(ReactionDelta {
            chat_id: removed.chat_id,
            message_id: removed.message_id,
            user: fallback_profile(&removed.user_id),
            added: remaining,
            removed: vec![removed.key],
        })
    }

    /// Drops every annotation on `message_id`. Returns how many were dropped.
    pub fn forget_message(&mut self, message_id: &str) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|_, a| a.message_id != message_id);
        before - self.annotations.len()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_becomes_addition() {
        let mut ledger = ReactionLedger::new();
        let delta = ledger.on_reaction("$r1", "!room", "$ann", "@ann:example.org", "👍");

        assert_eq!(delta.message_id, "$ann");
        assert_eq!(delta.added, vec!["👍"]);
        assert!(delta.removed.is_empty());
        assert_eq!(delta.user.display_name, "ann");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_redacting_last_reaction_is_pure_removal() {
        let mut ledger = ReactionLedger::new();
        ledger.on_reaction("$r1", "!room", "$ann", "@ann:example.org", "👍");

        let delta = ledger.on_redaction("$r1").unwrap();
        assert!(delta.added.is_empty());
        assert_eq!(delta.removed, vec!["👍"]);
        assert_eq!(delta.user.user_id, "@ann:example.org");
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_redaction_with_other_reaction_left_keeps_user() {
        let mut ledger = ReactionLedger::new();
        ledger.on_reaction("$r1", "!room", "$ann", "@ann:example.org", "👍");
        ledger.on_reaction("$r2", "!room", "$ann", "@ann:example.org", "🔥");
        ledger.on_reaction("$r3", "!room", "$ann", "@bob:example.org", "🎉");
        ledger.on_reaction("$r4", "!room", "$other", "@ann:example.org", "😀");

        let delta = ledger.on_redaction("$r1").unwrap();
        assert_eq!(delta.added, vec!["🔥"]);
        assert_eq!(delta.removed, vec!["👍"]);
    }

    #[test]
    fn test_forget_message_drops_only_its_annotations() {
        let mut ledger = ReactionLedger::new();
        ledger.on_reaction("$r1", "!room", "$ann", "@ann:example.org", "👍");
        ledger.on_reaction("$r2", "!room", "$ann", "@bob:example.org", "🎉");
        ledger.on_reaction("$r3", "!room", "$other", "@ann:example.org", "😀");

        assert_eq!(ledger.forget_message("$ann"), 2);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.on_redaction("$r1").is_none());
        assert!(ledger.on_redaction("$r3").is_some());
    }

    #[test]
    fn test_unknown_redaction_is_ignored() {
        let mut ledger = ReactionLedger::new();
        assert!(ledger.on_redaction("$message-not-a-reaction").is_none());
    }

    #[test]
    fn test_fallback_profile() {
        let profile = fallback_profile("@carol:matrix.org");
        assert_eq!(profile.handle, "@carol:matrix.org");
        assert_eq!(profile.display_name, "carol");
    }
}
