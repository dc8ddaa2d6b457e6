//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes the status display, closure announcements and command replies.

pub const AUTH_DENIED: &str = "🚫 **Authorization Denied**.";
pub const UNKNOWN_COMMAND: &str = "❓ Unknown command. Try `.help`.";
pub const NO_ACTIVE_AUCTIONS: &str = "❌ No active auctions.";
pub const NO_PARTICIPANTS_YET: &str = "_No participants yet. React to the announcement to join!_";
pub const MANUAL_CLOSE_ONLY: &str = "⏰ **Closes**: manually, by an administrator";
pub const CLOSING_NOW: &str = "closing now";
pub const NO_HANDLE: &str = "no handle";
pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";

// Status display

pub fn status_header(lot: &str, item: &str) -> String {
    format!("🔨 **Auction {lot}**: {item}")
}

pub fn participants_heading(count: usize) -> String {
    format!("👥 **Participants ({count})**:")
}

pub fn participant_label(handle: &str, display_name: &str) -> String {
    let handle = if handle.is_empty() { NO_HANDLE } else { handle };
    format!("{handle} ({display_name})")
}

pub fn deadline_line(deadline: &str, countdown: &str) -> String {
    format!("⏰ **Closes**: {deadline} · {countdown}")
}

// Closure

pub fn winner_announcement(lot: &str, item: &str, handle: &str, display_name: &str) -> String {
    format!(
        "🏆 **Winner of auction {lot}**: {item}\n\n👤 {}",
        participant_label(handle, display_name)
    )
}

pub fn no_participants_announcement(lot: &str, item: &str) -> String {
    format!("❌ Auction {lot} ({item}) closed without participants.")
}

pub fn auction_closed_confirmation(lot: &str) -> String {
    format!("✅ Auction {lot} closed. Result announced!")
}

pub fn auction_not_found(id: &str) -> String {
    format!("❌ Auction `{id}` not found.")
}

// Listing

pub const ACTIVE_AUCTIONS_HEADING: &str = "📋 **Active auctions:**";

pub fn auction_list_entry(
    lot: &str,
    item: &str,
    participants: usize,
    deadline: Option<&str>,
    opened: &str,
    id: &str,
) -> String {
    let deadline = deadline.unwrap_or("manual close");
    format!(
        "• **Auction {lot}**: {item}\n  Participants: {participants} · Closes: {deadline}\n  Opened: {opened} · ID: `{id}`"
    )
}

// Logs

pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}
