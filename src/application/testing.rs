//! Test doubles for the engine's collaborators.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::engine::AuctionEngine;
use crate::application::parsing::AnnouncementParser;
use crate::application::store::InMemoryAuctionStore;
use crate::domain::traits::{ChatProvider, Scheduler};
use crate::domain::types::{ClosureHandle, MemberProfile};

pub type TestEngine = AuctionEngine<FakeChat, InMemoryAuctionStore>;

/// Engine over fakes, UTC reference timezone, seeded winner draw.
pub fn engine(chat: FakeChat, seed: u64) -> (TestEngine, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::default());
    let parser = AnnouncementParser::new(
        &["Auction".to_string()],
        "?",
        FixedOffset::east_opt(0).unwrap(),
    )
    .unwrap();
    let engine = AuctionEngine::new(
        chat,
        InMemoryAuctionStore::new(),
        scheduler.clone(),
        parser,
        Box::new(StdRng::seed_from_u64(seed)),
    );
    (engine, scheduler)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: String, id: String, text: String },
    Edit { chat_id: String, id: String, text: String },
    Delete { chat_id: String, id: String },
}

/// Records every transport call. Lookups fail for users in `unknown_members`;
/// sends, edits and deletes fail while the chat is set failing.
#[derive(Default)]
pub struct FakeChat {
    pub log: Mutex<Vec<Sent>>,
    pub unknown_members: HashSet<String>,
    failing: AtomicBool,
    counter: Mutex<u64>,
}

impl FakeChat {
    pub fn failing() -> Self {
        let chat = Self::default();
        chat.set_failing(true);
        chat
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.log.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Delete { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }
}

pub fn profile(user_id: &str, name: &str) -> MemberProfile {
    MemberProfile {
        user_id: user_id.to_string(),
        handle: user_id.to_string(),
        display_name: name.to_string(),
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn send_message(&self, chat_id: &str, content: &str) -> Result<String, String> {
        if self.is_failing() {
            return Err("network down".to_string());
        }
        let id = {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            format!("$bot{}", counter)
        };
        self.log.lock().unwrap().push(Sent::Message {
            chat_id: chat_id.to_string(),
            id: id.clone(),
            text: content.to_string(),
        });
        Ok(id)
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), String> {
        if self.is_failing() {
            return Err("network down".to_string());
        }
        self.log.lock().unwrap().push(Sent::Edit {
            chat_id: chat_id.to_string(),
            id: message_id.to_string(),
            text: content.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), String> {
        if self.is_failing() {
            return Err("network down".to_string());
        }
        self.log.lock().unwrap().push(Sent::Delete {
            chat_id: chat_id.to_string(),
            id: message_id.to_string(),
        });
        Ok(())
    }

    async fn lookup_member(&self, _chat_id: &str, user_id: &str) -> Result<MemberProfile, String> {
        if self.unknown_members.contains(user_id) {
            return Err(format!("{user_id} not found"));
        }
        Ok(profile(user_id, &format!("Canonical {user_id}")))
    }
}

/// Scheduler that only records; tests fire closures by hand.
#[derive(Default)]
pub struct ManualScheduler {
    pub scheduled: Mutex<Vec<(ClosureHandle, DateTime<Utc>, String)>>,
    pub cancelled: Mutex<Vec<ClosureHandle>>,
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, at: DateTime<Utc>, announcement_id: &str) -> ClosureHandle {
        let mut scheduled = self.scheduled.lock().unwrap();
        let handle = ClosureHandle(scheduled.len() as u64 + 1);
        scheduled.push((handle, at, announcement_id.to_string()));
        handle
    }

    fn cancel(&self, handle: ClosureHandle) {
        self.cancelled.lock().unwrap().push(handle);
    }
}
