//! # Domain Types
//!
//! Common data structures and enums used across the application logic:
//! the auction record, participants, inbound events and the core error type.

use chrono::{DateTime, Utc};
use std::fmt;

/// Profile of a chat member as cached on the auction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub user_id: String,
    /// Mention-able handle, empty when the member has none.
    pub handle: String,
    pub display_name: String,
}

/// A member currently reacting to an announcement.
pub type Participant = MemberProfile;

/// Deadline clause as written in the announcement, before resolution to a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineSpec {
    NoDeadline,
    RelativeDeadline { hours: u32 },
    AbsoluteDeadline { hour: u32, minute: u32 },
}

/// One open auction.
#[derive(Debug, Clone)]
pub struct AuctionRecord {
    pub announcement_id: String,
    pub lot_number: String,
    pub item_description: String,
    pub chat_id: String,
    pub status_display_id: Option<String>,
    /// Insertion-ordered, at most one entry per user.
    pub participants: Vec<Participant>,
    pub deadline: Option<DateTime<Utc>>,
    pub scheduled_closure_handle: Option<ClosureHandle>,
    pub created_at: DateTime<Utc>,
}

impl AuctionRecord {
    pub fn new(
        announcement_id: String,
        chat_id: String,
        lot_number: String,
        item_description: String,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            announcement_id,
            lot_number,
            item_description,
            chat_id,
            status_display_id: None,
            participants: Vec::new(),
            deadline,
            scheduled_closure_handle: None,
            created_at: Utc::now(),
        }
    }

    /// Adds the member or refreshes their cached profile in place.
    pub fn upsert_participant(&mut self, profile: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == profile.user_id)
        {
            Some(existing) => *existing = profile,
            None => self.participants.push(profile),
        }
    }

    /// Returns `true` if the user was a participant.
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user_id != user_id);
        self.participants.len() != before
    }
}

/// Opaque reference to a pending scheduled closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosureHandle(pub u64);

/// A new text message that may be an announcement.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub message_id: String,
    pub sender: String,
    pub text: String,
}

/// Change in a user's reactions to a single message.
#[derive(Debug, Clone)]
pub struct ReactionDelta {
    pub chat_id: String,
    pub message_id: String,
    /// Profile embedded in the event, used when the member lookup fails.
    pub user: MemberProfile,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// A dot-command issued in a chat.
#[derive(Debug, Clone)]
pub struct AdminCommand {
    pub issuer_id: String,
    pub chat_id: String,
    pub command_name: String,
    pub args: Vec<String>,
}

impl AdminCommand {
    /// Splits `.close 12` into name `.close` and args `["12"]`.
    pub fn parse(issuer_id: &str, chat_id: &str, body: &str) -> Self {
        let mut parts = body.split_whitespace();
        let command_name = parts.next().unwrap_or_default().to_lowercase();
        Self {
            issuer_id: issuer_id.to_string(),
            chat_id: chat_id.to_string(),
            command_name,
            args: parts.map(str::to_string).collect(),
        }
    }
}

/// Everything the dispatcher consumes, in arrival order.
#[derive(Debug, Clone)]
pub enum BotEvent {
    Message(IncomingMessage),
    Reaction(ReactionDelta),
    Command(AdminCommand),
    ClosureDue(String),
    RefreshDisplays,
}

/// How a closure was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Scheduled,
}

/// Terminal outcome of a resolved auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Winner(Participant),
    NoParticipants,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionError {
    NotFound(String),
    AlreadyExists(String),
    Unauthorized(String),
}

impl fmt::Display for AuctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionError::NotFound(id) => write!(f, "auction {id} not found"),
            AuctionError::AlreadyExists(id) => write!(f, "auction {id} already exists"),
            AuctionError::Unauthorized(user) => write!(f, "{user} is not an administrator"),
        }
    }
}

impl std::error::Error for AuctionError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str) -> MemberProfile {
        MemberProfile {
            user_id: id.to_string(),
            handle: id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn record() -> AuctionRecord {
        AuctionRecord::new(
            "$ann".to_string(),
            "!room".to_string(),
            "1".to_string(),
            "Sword".to_string(),
            None,
        )
    }

    #[test]
    fn test_upsert_keeps_position_and_refreshes_profile() {
        let mut rec = record();
        rec.upsert_participant(member("@a", "Alice"));
        rec.upsert_participant(member("@b", "Bob"));
        rec.upsert_participant(member("@a", "Alice Renamed"));

        assert_eq!(rec.participants.len(), 2);
        assert_eq!(rec.participants[0].display_name, "Alice Renamed");
        assert_eq!(rec.participants[1].user_id, "@b");
    }

    #[test]
    fn test_remove_absent_participant_is_noop() {
        let mut rec = record();
        rec.upsert_participant(member("@a", "Alice"));
        assert!(!rec.remove_participant("@zed"));
        assert!(rec.remove_participant("@a"));
        assert!(rec.participants.is_empty());
    }

    #[test]
    fn test_command_parsing() {
        let cmd = AdminCommand::parse("@admin", "!room", "  .CLOSE   12  ");
        assert_eq!(cmd.command_name, ".close");
        assert_eq!(cmd.args, vec!["12"]);

        let bare = AdminCommand::parse("@admin", "!room", ".auctions");
        assert!(bare.args.is_empty());
    }
}
