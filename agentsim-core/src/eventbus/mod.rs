//! src/eventbus/mod.rs
//!
//! In-process event bus that lets the presentation layer react to store
//! mutations. Each subscriber gets its own bounded MPSC queue.

use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;
use uuid::Uuid;

use agentsim_common::models::{AggregateStats, LogEntry, Platform};

/// Emitted once per committed store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    LogAppended(LogEntry),

    StatsChanged(AggregateStats),

    /// One engagement tick merged increments for `active_posts` posts.
    EngagementTicked { active_posts: usize },

    ThreadOpened {
        thread_id: Uuid,
        handle: String,
        platform: Platform,
    },

    ThreadReplied { thread_id: Uuid },

    StatusChanged(String),

    ActivePlatformChanged(Platform),

    /// The run was torn down; nothing follows this event.
    RunStopped,
}

impl SimEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SimEvent::LogAppended(_) => "log.appended",
            SimEvent::StatsChanged(_) => "stats.changed",
            SimEvent::EngagementTicked { .. } => "engagement.ticked",
            SimEvent::ThreadOpened { .. } => "thread.opened",
            SimEvent::ThreadReplied { .. } => "thread.replied",
            SimEvent::StatusChanged(_) => "status.changed",
            SimEvent::ActivePlatformChanged(_) => "platform.changed",
            SimEvent::RunStopped => "run.stopped",
        }
    }
}

/// Each subscriber gets its own bounded `mpsc::Sender<SimEvent>`.
///
/// - Publishing never waits: a subscriber whose buffer is full misses the
///   event, so a slow reader cannot stall the simulation.
/// - If a subscriber dropped its `Receiver`, it is pruned.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<SimEvent>>>>,
}

const DEFAULT_BUFFER_SIZE: usize = 1024;

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<SimEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Offers `event` to every live subscriber and returns how many took it.
    pub async fn publish(&self, event: SimEvent) -> usize {
        let mut subs = self.subscribers.lock().await;
        subs.retain(|s| !s.is_closed());

        let mut delivered = 0;
        for s in subs.iter() {
            match s.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    trace!("subscriber lagging; dropped {}", event.event_type());
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}
