//! # Auction Commands
//!
//! Handles `.auctions` (list open auctions) and `.close` (resolve one now).

use crate::application::engine::AuctionEngine;
use crate::application::status::format_deadline;
use crate::domain::config::AppConfig;
use crate::domain::traits::{AuctionStore, ChatProvider};
use crate::domain::types::{AdminCommand, Trigger};
use crate::interface::commands::{admin, reply};
use crate::strings::messages;

pub async fn handle_list<C, S>(engine: &AuctionEngine<C, S>, cmd: &AdminCommand)
where
    C: ChatProvider,
    S: AuctionStore,
{
    let records = engine.store().list();
    if records.is_empty() {
        reply(engine.chat(), &cmd.chat_id, messages::NO_ACTIVE_AUCTIONS).await;
        return;
    }

    let timezone = engine.timezone();
    let entries: Vec<String> = records
        .iter()
        .map(|r| {
            let deadline = r.deadline.map(|d| format_deadline(d, timezone));
            messages::auction_list_entry(
                &r.lot_number,
                &r.item_description,
                r.participants.len(),
                deadline.as_deref(),
                &format_deadline(r.created_at, timezone),
                &r.announcement_id,
            )
        })
        .collect();
    let text = format!("{}\n\n{}", messages::ACTIVE_AUCTIONS_HEADING, entries.join("\n\n"));
    reply(engine.chat(), &cmd.chat_id, &text).await;
}

/// Closes the auction named by the first argument (ID or lot), or the latest one.
pub async fn handle_close<C, S>(
    config: &AppConfig,
    engine: &mut AuctionEngine<C, S>,
    cmd: &AdminCommand,
) where
    C: ChatProvider,
    S: AuctionStore,
{
    if admin::authorize(config, &cmd.issuer_id).is_err() {
        reply(engine.chat(), &cmd.chat_id, messages::AUTH_DENIED).await;
        return;
    }
    if engine.store().list().is_empty() {
        reply(engine.chat(), &cmd.chat_id, messages::NO_ACTIVE_AUCTIONS).await;
        return;
    }

    let identifier = cmd.args.first();
    let target = match identifier {
        Some(identifier) => engine.find(identifier),
        None => engine.latest(),
    }
    .map(|r| (r.announcement_id.clone(), r.lot_number.clone(), r.chat_id.clone()));

    let Some((announcement_id, lot, auction_chat)) = target else {
        let shown = identifier.map(String::as_str).unwrap_or_default();
        reply(engine.chat(), &cmd.chat_id, &messages::auction_not_found(shown)).await;
        return;
    };

    tracing::info!("{} is closing auction {} ({})", cmd.issuer_id, lot, announcement_id);
    match engine.resolve(&announcement_id, Trigger::Manual).await {
        Ok(_) => {
            // The result is already announced in the auction's own chat
            if auction_chat != cmd.chat_id {
                reply(
                    engine.chat(),
                    &cmd.chat_id,
                    &messages::auction_closed_confirmation(&lot),
                )
                .await;
            }
        }
        Err(e) => {
            tracing::warn!("Manual close of {} failed: {}", announcement_id, e);
            reply(
                engine.chat(),
                &cmd.chat_id,
                &messages::auction_not_found(&announcement_id),
            )
            .await;
        }
    }
}
