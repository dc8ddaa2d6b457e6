//! # Auction Engine
//!
//! Owns the auction lifecycle: opening auctions from announcements, tracking participants,
//! refreshing status displays and resolving auctions into a winner.
//!
//! The engine is driven by a single dispatcher task, so handlers never run in parallel.
//! They can still suspend on transport calls, which is why `resolve` removes the record
//! and cancels its trigger before awaiting anything.

use chrono::{FixedOffset, Utc};
use rand::RngCore;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::application::parsing::AnnouncementParser;
use crate::application::{participation, status};
use crate::domain::traits::{AuctionStore, ChatProvider, Scheduler};
use crate::domain::types::{
    AuctionError, AuctionRecord, BotEvent, IncomingMessage, ReactionDelta, Resolution, Trigger,
};
use crate::strings::messages;

pub type SharedRng = Box<dyn RngCore + Send + Sync>;

pub struct AuctionEngine<C, S>
where
    C: ChatProvider,
    S: AuctionStore,
{
    chat: C,
    store: S,
    scheduler: Arc<dyn Scheduler>,
    parser: AnnouncementParser,
    rng: SharedRng,
    released: Option<UnboundedSender<String>>,
}

impl<C, S> AuctionEngine<C, S>
where
    C: ChatProvider,
    S: AuctionStore,
{
    pub fn new(
        chat: C,
        store: S,
        scheduler: Arc<dyn Scheduler>,
        parser: AnnouncementParser,
        rng: SharedRng,
    ) -> Self {
        Self {
            chat,
            store,
            scheduler,
            parser,
            rng,
            released: None,
        }
    }

    /// Reports message IDs whose reactions no longer matter: closed auctions and
    /// messages that never were one.
    pub fn with_release_notifier(mut self, released: UnboundedSender<String>) -> Self {
        self.released = Some(released);
        self
    }

    fn release(&self, message_id: &str) {
        if let Some(released) = &self.released
            && released.send(message_id.to_string()).is_err()
        {
            tracing::debug!("Release listener gone, {} not reported", message_id);
        }
    }

    pub fn chat(&self) -> &C {
        &self.chat
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timezone(&self) -> FixedOffset {
        self.parser.timezone()
    }

    /// Handles every non-command event.
    pub async fn handle(&mut self, event: BotEvent) {
        match event {
            BotEvent::Message(message) => {
                self.open_auction(&message).await;
            }
            BotEvent::Reaction(delta) => {
                self.apply_reaction(&delta).await;
            }
            BotEvent::ClosureDue(announcement_id) => {
                match self.resolve(&announcement_id, Trigger::Scheduled).await {
                    Ok(_) => {}
                    Err(AuctionError::NotFound(_)) => {
                        tracing::debug!("Scheduled closure of {} found nothing to close", announcement_id);
                    }
                    Err(e) => tracing::error!("Scheduled closure of {} failed: {}", announcement_id, e),
                }
            }
            BotEvent::RefreshDisplays => self.refresh_displays().await,
            BotEvent::Command(cmd) => {
                tracing::warn!("Command {} reached the engine unrouted", cmd.command_name);
            }
        }
    }

    /// Opens an auction if the message is an announcement. Returns its ID.
    pub async fn open_auction(&mut self, message: &IncomingMessage) -> Option<String> {
        let announcement = self.parser.parse_at(&message.text, Utc::now())?;

        let record = AuctionRecord::new(
            message.message_id.clone(),
            message.chat_id.clone(),
            announcement.lot_number,
            announcement.item_description,
            announcement.deadline,
        );
        if let Err(e) = self.store.create(record) {
            tracing::warn!("Ignoring announcement {}: {}", message.message_id, e);
            return None;
        }

        let timezone = self.timezone();
        let record = self.store.get_mut(&message.message_id)?;
        if let Some(deadline) = record.deadline {
            record.scheduled_closure_handle =
                Some(self.scheduler.schedule_once(deadline, &record.announcement_id));
        }
        tracing::info!(
            "Opened auction {} ({}) by {} in {}: {} [deadline: {:?}]",
            record.lot_number,
            record.announcement_id,
            message.sender,
            record.chat_id,
            record.item_description,
            record.deadline
        );

        let text = status::render(record, Utc::now(), timezone);
        status::push(&self.chat, record, &text).await;
        Some(message.message_id.clone())
    }

    pub async fn apply_reaction(&mut self, delta: &ReactionDelta) -> bool {
        if self.store.get(&delta.message_id).is_none() {
            self.release(&delta.message_id);
            return false;
        }
        let timezone = self.timezone();
        participation::apply_reaction_delta(&self.chat, &mut self.store, timezone, delta).await
    }

    /// Closes an auction, whichever way it was triggered.
    ///
    /// The record leaves the store before any transport call, so a second trigger for the
    /// same auction gets `NotFound`.
    pub async fn resolve(
        &mut self,
        announcement_id: &str,
        trigger: Trigger,
    ) -> Result<Resolution, AuctionError> {
        let record = self.store.delete(announcement_id)?;
        if let Some(handle) = record.scheduled_closure_handle {
            self.scheduler.cancel(handle);
        }
        self.release(&record.announcement_id);

        let resolution = match record.participants.choose(&mut *self.rng) {
            Some(winner) => Resolution::Winner(winner.clone()),
            None => Resolution::NoParticipants,
        };
        tracing::info!(
            "Resolved auction {} ({}) via {:?}: {:?}",
            record.lot_number,
            record.announcement_id,
            trigger,
            resolution
        );

        if let Some(display_id) = &record.status_display_id
            && let Err(e) = self.chat.delete_message(&record.chat_id, display_id).await
        {
            tracing::warn!(
                "Failed to delete status display of {}: {}",
                record.announcement_id,
                e
            );
        }

        let announcement = match &resolution {
            Resolution::Winner(winner) => messages::winner_announcement(
                &record.lot_number,
                &record.item_description,
                &winner.handle,
                &winner.display_name,
            ),
            Resolution::NoParticipants => {
                messages::no_participants_announcement(&record.lot_number, &record.item_description)
            }
        };
        if let Err(e) = self.chat.send_message(&record.chat_id, &announcement).await {
            tracing::error!(
                "Failed to announce result of auction {}: {}",
                record.announcement_id,
                e
            );
        }

        Ok(resolution)
    }

    /// Re-renders every auction with a deadline so its countdown stays current,
    /// and retries displays whose first send failed.
    pub async fn refresh_displays(&mut self) {
        let timezone = self.timezone();
        let ids: Vec<String> = self
            .store
            .list()
            .into_iter()
            .filter(|r| r.deadline.is_some() || r.status_display_id.is_none())
            .map(|r| r.announcement_id.clone())
            .collect();

        for id in ids {
            if let Some(record) = self.store.get_mut(&id) {
                let text = status::render(record, Utc::now(), timezone);
                status::push(&self.chat, record, &text).await;
            }
        }
    }

    /// The most recently created open auction.
    pub fn latest(&self) -> Option<&AuctionRecord> {
        self.store.list().into_iter().last()
    }

    /// Finds an auction by announcement ID, falling back to the first open auction with that lot.
    pub fn find(&self, identifier: &str) -> Option<&AuctionRecord> {
        self.store.get(identifier).or_else(|| {
            self.store
                .list()
                .into_iter()
                .find(|r| r.lot_number == identifier)
        })
    }
}
