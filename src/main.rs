#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Initializes the auction bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix
//! - Application: Engine, Scheduler, Router, Dispatcher
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::{
        reaction::OriginalSyncReactionEvent,
        room::{
            member::{MembershipState, StrippedRoomMemberEvent},
            message::{MessageType, SyncRoomMessageEvent},
            redaction::OriginalSyncRoomRedactionEvent,
        },
    },
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, mpsc};

use crate::application::engine::AuctionEngine;
use crate::application::parsing::AnnouncementParser;
use crate::application::router::CommandRouter;
use crate::application::scheduler::TokioScheduler;
use crate::application::store::InMemoryAuctionStore;
use crate::domain::config::AppConfig;
use crate::domain::types::{AdminCommand, BotEvent, IncomingMessage};
use crate::infrastructure::matrix::{MatrixService, ReactionLedger};
use crate::strings::messages;

/// Reaction-based auctions for Matrix rooms.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the YAML configuration
    #[arg(long, default_value = "data/config.yaml")]
    config: String,
}

fn is_before(ts_millis: u64, start_time: SystemTime) -> bool {
    UNIX_EPOCH + Duration::from_millis(ts_millis) < start_time
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting Auctioneer...");
    tracing::info!("{}", messages::config_loaded(&config.services.matrix.username));

    // 3. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await
        .context("Matrix login failed")?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    if let Some(name) = &config.services.matrix.display_name
        && let Err(e) = client.account().set_display_name(Some(name.as_str())).await
    {
        tracing::warn!("Failed to set display name: {}", e);
    }

    // 4. Engine and its single event queue
    let (events_tx, events_rx) = mpsc::unbounded_channel::<BotEvent>();
    let scheduler = Arc::new(TokioScheduler::new(events_tx.clone()));
    let parser = AnnouncementParser::new(
        &config.auction.keywords,
        &config.auction.placeholder_lot,
        config.auction.timezone(),
    )
    .context("Invalid announcement keywords")?;

    let (released_tx, mut released_rx) = mpsc::unbounded_channel::<String>();
    let engine = AuctionEngine::new(
        MatrixService::new(client.clone()),
        InMemoryAuctionStore::new(),
        scheduler,
        parser,
        Box::new(StdRng::from_entropy()),
    )
    .with_release_notifier(released_tx);
    let router = CommandRouter::new(config.clone());
    let dispatcher = tokio::spawn(application::dispatcher::run(engine, router, events_rx));

    // Countdown Refresh Loop
    if config.auction.refresh_interval_secs > 0 {
        let refresh_tx = events_tx.clone();
        let period = Duration::from_secs(config.auction.refresh_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if refresh_tx.send(BotEvent::RefreshDisplays).is_err() {
                    break;
                }
            }
        });
    }

    // 5. Event Handlers
    let start_time = SystemTime::now();
    let ledger = Arc::new(Mutex::new(ReactionLedger::new()));

    // Reactions on closed auctions and ordinary messages are dropped from the ledger
    let prune_ledger = ledger.clone();
    tokio::spawn(async move {
        while let Some(message_id) = released_rx.recv().await {
            let dropped = prune_ledger.lock().await.forget_message(&message_id);
            tracing::debug!("Released {} reactions on {}", dropped, message_id);
        }
    });

    let message_tx = events_tx.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let events = message_tx.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };
            // Ignore events older than start_time
            if is_before(ev.origin_server_ts().get().into(), start_time) {
                return;
            }
            if original_msg.sender == room.own_user_id() {
                return;
            }
            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };

            let body = text_content.body.trim();
            let chat_id = room.room_id().to_string();
            let sender = original_msg.sender.to_string();
            tracing::info!("Received message from {}: \n{}", sender, body);

            let event = if body.starts_with('.') {
                BotEvent::Command(AdminCommand::parse(&sender, &chat_id, body))
            } else {
                BotEvent::Message(IncomingMessage {
                    chat_id,
                    message_id: original_msg.event_id.to_string(),
                    sender,
                    text: body.to_string(),
                })
            };
            if events.send(event).is_err() {
                tracing::error!("Event queue closed, dropping message");
            }
        }
    });

    let reaction_tx = events_tx.clone();
    let reaction_ledger = ledger.clone();
    client.add_event_handler(move |ev: OriginalSyncReactionEvent, room: Room| {
        let events = reaction_tx.clone();
        let ledger = reaction_ledger.clone();
        async move {
            if is_before(ev.origin_server_ts.get().into(), start_time) {
                return;
            }
            if ev.sender == room.own_user_id() {
                return;
            }
            let delta = ledger.lock().await.on_reaction(
                ev.event_id.as_str(),
                room.room_id().as_str(),
                ev.content.relates_to.event_id.as_str(),
                ev.sender.as_str(),
                &ev.content.relates_to.key,
            );
            if events.send(BotEvent::Reaction(delta)).is_err() {
                tracing::error!("Event queue closed, dropping reaction");
            }
        }
    });

    let redaction_tx = events_tx.clone();
    let redaction_ledger = ledger.clone();
    client.add_event_handler(move |ev: OriginalSyncRoomRedactionEvent| {
        let events = redaction_tx.clone();
        let ledger = redaction_ledger.clone();
        async move {
            let Some(redacts) = ev.content.redacts.clone().or_else(|| ev.redacts.clone()) else {
                return;
            };
            let delta = {
                let mut guard = ledger.lock().await;
                let delta = guard.on_redaction(redacts.as_str());
                tracing::debug!("Reaction ledger holds {} annotations", guard.len());
                delta
            };
            if let Some(delta) = delta
                && events.send(BotEvent::Reaction(delta)).is_err()
            {
                tracing::error!("Event queue closed, dropping reaction removal");
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite
            && let Err(e) = room.join().await
        {
            tracing::warn!("{}", messages::join_invite_fail(&e.to_string()));
        }
    });
    drop(events_tx);

    // 6. Start Loops
    tracing::info!("{}", messages::SYNC_LOOP_START);
    let sync_client = client.clone();
    let sync_handle = tokio::spawn(async move { sync_client.sync(SyncSettings::default()).await });

    match sync_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("{}", messages::sync_loop_fail(&e.to_string())),
        Err(e) => tracing::error!("Matrix Sync Panic: {}", e),
    }
    dispatcher.abort();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_config_path() {
        let cli = Cli::parse_from(["auctioneer"]);
        assert_eq!(cli.config, "data/config.yaml");

        let cli = Cli::parse_from(["auctioneer", "--config", "/etc/auctioneer.yaml"]);
        assert_eq!(cli.config, "/etc/auctioneer.yaml");
    }

    #[test]
    fn test_events_before_start_are_stale() {
        let start = UNIX_EPOCH + Duration::from_secs(1_000);
        assert!(is_before(999_000, start));
        assert!(!is_before(1_000_000, start));
    }
}
