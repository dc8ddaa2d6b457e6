//! # Domain Traits
//!
//! Abstract interfaces for the collaborators of the auction engine (chat transport, store, scheduler).
//! Allows for pluggable implementations in the Infrastructure and Application layers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::types::{AuctionError, AuctionRecord, ClosureHandle, MemberProfile};

/// Abstract interface for a Chat Provider (e.g., Matrix)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the chat, returning its ID
    async fn send_message(&self, chat_id: &str, content: &str) -> Result<String, String>;

    /// Edit a message in place
    async fn edit_message(&self, chat_id: &str, message_id: &str, content: &str)
    -> Result<(), String>;

    /// Delete (redact) a message
    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), String>;

    /// Resolve the canonical profile of a chat member
    async fn lookup_member(&self, chat_id: &str, user_id: &str) -> Result<MemberProfile, String>;
}

/// Holds every open auction for the lifetime of the process.
pub trait AuctionStore: Send + Sync {
    /// Fails with `AlreadyExists` instead of overwriting.
    fn create(&mut self, record: AuctionRecord) -> Result<(), AuctionError>;

    fn get(&self, announcement_id: &str) -> Option<&AuctionRecord>;

    fn get_mut(&mut self, announcement_id: &str) -> Option<&mut AuctionRecord>;

    /// Removes and returns the record.
    fn delete(&mut self, announcement_id: &str) -> Result<AuctionRecord, AuctionError>;

    /// All open records in creation order.
    fn list(&self) -> Vec<&AuctionRecord>;
}

/// One-shot future triggers, keyed by auction.
pub trait Scheduler: Send + Sync {
    /// Arranges for `announcement_id` to be closed at or after `at`.
    fn schedule_once(&self, at: DateTime<Utc>, announcement_id: &str) -> ClosureHandle;

    /// No-op for handles that already fired or were cancelled.
    fn cancel(&self, handle: ClosureHandle);
}
