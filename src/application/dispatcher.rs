//! # Event Dispatcher
//!
//! Drains the single event queue that chat events, scheduled closures and refresh ticks share.
//! Events are handled strictly one at a time, so the store needs no locking.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::application::engine::AuctionEngine;
use crate::application::router::CommandRouter;
use crate::domain::traits::{AuctionStore, ChatProvider};
use crate::domain::types::BotEvent;

/// Runs until every sender is dropped, then hands the engine back.
pub async fn run<C, S>(
    mut engine: AuctionEngine<C, S>,
    router: CommandRouter,
    mut events: UnboundedReceiver<BotEvent>,
) -> AuctionEngine<C, S>
where
    C: ChatProvider,
    S: AuctionStore,
{
    tracing::info!("Dispatcher started");
    while let Some(event) = events.recv().await {
        match event {
            BotEvent::Command(cmd) => router.route(&mut engine, &cmd).await,
            other => engine.handle(other).await,
        }
    }
    tracing::info!("Event queue closed, dispatcher stopping");
    engine
}
