//! # Participation Tracking
//!
//! Applies reaction deltas to an auction's participant list and refreshes its status display.

use chrono::{FixedOffset, Utc};

use crate::application::status;
use crate::domain::traits::{AuctionStore, ChatProvider};
use crate::domain::types::{MemberProfile, ReactionDelta};

/// Returns `true` if the participant list changed.
///
/// Any added reaction counts as "still reacting", even when the same delta also removes one.
/// Unknown announcements are ignored.
pub async fn apply_reaction_delta<C, S>(
    chat: &C,
    store: &mut S,
    timezone: FixedOffset,
    delta: &ReactionDelta,
) -> bool
where
    C: ChatProvider + ?Sized,
    S: AuctionStore + ?Sized,
{
    if store.get(&delta.message_id).is_none() {
        return false;
    }

    let changed = if !delta.added.is_empty() {
        let profile = resolve_profile(chat, delta).await;
        // The lookup suspended, so the record may be gone by now
        let Some(record) = store.get_mut(&delta.message_id) else {
            return false;
        };
        tracing::info!(
            "{} joined auction {} ({})",
            profile.user_id,
            record.lot_number,
            record.announcement_id
        );
        record.upsert_participant(profile);
        true
    } else if !delta.removed.is_empty() {
        let Some(record) = store.get_mut(&delta.message_id) else {
            return false;
        };
        let removed = record.remove_participant(&delta.user.user_id);
        if removed {
            tracing::info!(
                "{} left auction {} ({})",
                delta.user.user_id,
                record.lot_number,
                record.announcement_id
            );
        }
        removed
    } else {
        false
    };

    if changed && let Some(record) = store.get_mut(&delta.message_id) {
        let text = status::render(record, Utc::now(), timezone);
        status::push(chat, record, &text).await;
    }
    changed
}

/// Canonical member profile, or the one embedded in the event if the lookup fails.
async fn resolve_profile<C>(chat: &C, delta: &ReactionDelta) -> MemberProfile
where
    C: ChatProvider + ?Sized,
{
    match chat.lookup_member(&delta.chat_id, &delta.user.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                "Member lookup for {} failed, using event profile: {}",
                delta.user.user_id,
                e
            );
            delta.user.clone()
        }
    }
}
