//! # Command Router
//!
//! Routes administrator commands to the appropriate handler (in `interface/commands`).
//! Commands arrive pre-split into name and arguments (e.g., `.close 12`).

use crate::application::engine::AuctionEngine;
use crate::domain::config::AppConfig;
use crate::domain::traits::{AuctionStore, ChatProvider};
use crate::domain::types::AdminCommand;
use crate::interface::commands;

pub struct CommandRouter {
    config: AppConfig,
}

impl CommandRouter {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn route<C, S>(&self, engine: &mut AuctionEngine<C, S>, cmd: &AdminCommand)
    where
        C: ChatProvider,
        S: AuctionStore,
    {
        tracing::info!(
            "Router dispatching cmd='{}' args={:?} sender='{}'",
            cmd.command_name,
            cmd.args,
            cmd.issuer_id
        );

        match cmd.command_name.as_str() {
            ".help" | ".start" => {
                commands::help::handle_help(engine.chat(), cmd).await;
            }
            ".auctions" | ".list" | ".list_auctions" => {
                commands::auctions::handle_list(engine, cmd).await;
            }
            ".close" | ".finish" | ".finish_auction" | ".завершить" => {
                commands::auctions::handle_close(&self.config, engine, cmd).await;
            }
            _ => {
                commands::reply(
                    engine.chat(),
                    &cmd.chat_id,
                    crate::strings::messages::UNKNOWN_COMMAND,
                )
                .await;
            }
        }
    }
}
