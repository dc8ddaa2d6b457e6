//! # Closure Scheduler
//!
//! `Scheduler` backed by tokio timers. A firing does not resolve anything itself; it pushes
//! `BotEvent::ClosureDue` onto the dispatcher queue so closures are serialized with chat events.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::domain::traits::Scheduler;
use crate::domain::types::{BotEvent, ClosureHandle};

type PendingMap = HashMap<u64, AbortHandle>;

pub struct TokioScheduler {
    events: UnboundedSender<BotEvent>,
    next_id: AtomicU64,
    pending: Arc<Mutex<PendingMap>>,
}

impl TokioScheduler {
    pub fn new(events: UnboundedSender<BotEvent>) -> Self {
        Self {
            events,
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of triggers that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, at: DateTime<Utc>, announcement_id: &str) -> ClosureHandle {
        let handle_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = (at - Utc::now()).to_std().unwrap_or_default();
        let events = self.events.clone();
        let pending = self.pending.clone();
        let announcement_id = announcement_id.to_string();

        tracing::debug!(
            "Scheduling closure #{} for {} in {:?}",
            handle_id,
            announcement_id,
            delay
        );

        // Held across spawn so the task cannot deregister before it is registered
        let mut guard = lock(&self.pending);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&pending).remove(&handle_id);
            if events
                .send(BotEvent::ClosureDue(announcement_id.clone()))
                .is_err()
            {
                tracing::warn!(
                    "Event queue closed, dropping scheduled closure of {}",
                    announcement_id
                );
            }
        });
        guard.insert(handle_id, task.abort_handle());

        ClosureHandle(handle_id)
    }

    fn cancel(&self, handle: ClosureHandle) {
        if let Some(task) = lock(&self.pending).remove(&handle.0) {
            task.abort();
            tracing::debug!("Cancelled closure #{}", handle.0);
        }
    }
}
