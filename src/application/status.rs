//! # Status Display
//!
//! Renders the live status message of an auction (participants, deadline, countdown)
//! and keeps it in sync in the chat: sent once, then edited in place.

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::traits::ChatProvider;
use crate::domain::types::AuctionRecord;
use crate::strings::messages;

pub fn render(record: &AuctionRecord, now: DateTime<Utc>, timezone: FixedOffset) -> String {
    let mut text = messages::status_header(&record.lot_number, &record.item_description);
    text.push_str("\n\n");

    text.push_str(&messages::participants_heading(record.participants.len()));
    text.push('\n');
    if record.participants.is_empty() {
        text.push_str(messages::NO_PARTICIPANTS_YET);
        text.push('\n');
    } else {
        for (index, participant) in record.participants.iter().enumerate() {
            text.push_str(&format!(
                "{}. {}\n",
                index + 1,
                messages::participant_label(&participant.handle, &participant.display_name)
            ));
        }
    }
    text.push('\n');

    match record.deadline {
        Some(deadline) => text.push_str(&messages::deadline_line(
            &format_deadline(deadline, timezone),
            &format_countdown(deadline - now),
        )),
        None => text.push_str(messages::MANUAL_CLOSE_ONLY),
    }
    text
}

pub fn format_deadline(deadline: DateTime<Utc>, timezone: FixedOffset) -> String {
    deadline
        .with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M (UTC%:z)")
        .to_string()
}

fn format_countdown(remaining: chrono::Duration) -> String {
    if remaining <= chrono::Duration::zero() {
        return messages::CLOSING_NOW.to_string();
    }
    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    match (days, hours, minutes) {
        (0, 0, 0) => "<1m".to_string(),
        (0, 0, m) => format!("{m}m"),
        (0, h, m) => format!("{h}h {m}m"),
        (d, h, m) => format!("{d}d {h}h {m}m"),
    }
}

/// Sends the status message the first time, edits it afterwards.
///
/// Failures are logged only: the auction stays correct without its display.
pub async fn push<C>(chat: &C, record: &mut AuctionRecord, text: &str)
where
    C: ChatProvider + ?Sized,
{
    match &record.status_display_id {
        Some(display_id) => {
            if let Err(e) = chat.edit_message(&record.chat_id, display_id, text).await {
                tracing::warn!(
                    "Failed to update status display of {}: {}",
                    record.announcement_id,
                    e
                );
            }
        }
        None => match chat.send_message(&record.chat_id, text).await {
            Ok(display_id) => record.status_display_id = Some(display_id),
            Err(e) => tracing::warn!(
                "Failed to send status display of {}: {}",
                record.announcement_id,
                e
            ),
        },
    }
}
