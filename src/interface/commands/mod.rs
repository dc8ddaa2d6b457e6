//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., .auctions, .close, .help).
//! These handlers are invoked by the Router.

pub mod admin;
pub mod auctions;
pub mod help;

use crate::domain::traits::ChatProvider;

/// Sends a command reply. Failures are logged, never raised.
pub async fn reply(chat: &impl ChatProvider, chat_id: &str, text: &str) {
    if let Err(e) = chat.send_message(chat_id, text).await {
        tracing::warn!("Failed to reply in {}: {}", chat_id, e);
    }
}
