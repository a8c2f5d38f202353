// File: agentsim-core/src/store/mod.rs
//
// Shared handle to the run's state. Each mutation is a single closure applied
// under the lock against the current value, so interleaved timer callbacks
// never merge into a stale copy.

pub mod state;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use agentsim_common::models::{
    ChatMessage, ConversationThread, EngagementDelta, LogCategory, Platform, SimulationSnapshot,
    StatKind,
};

use crate::eventbus::{EventBus, SimEvent};
pub use state::{SimulationStore, INITIAL_STATUS};

struct Guarded {
    store: SimulationStore,
    closed: bool,
}

#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<Guarded>>,
    event_bus: EventBus,
}

impl StoreHandle {
    pub fn new(store: SimulationStore, event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Guarded { store, closed: false })),
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Applies `f` atomically and publishes the resulting events after the
    /// lock is released. Returns `None` without calling `f` once closed.
    pub async fn update<F, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut SimulationStore) -> T,
    {
        let (out, events) = {
            let mut guard = self.inner.lock().await;
            if guard.closed {
                trace!("store closed; dropping mutation");
                return None;
            }
            let out = f(&mut guard.store);
            (out, guard.store.take_events())
        };
        for event in events {
            self.event_bus.publish(event).await;
        }
        Some(out)
    }

    pub async fn append_log(&self, message: impl Into<String>, category: LogCategory) {
        let message = message.into();
        self.update(move |s| {
            s.append_log(message, category);
        })
        .await;
    }

    pub async fn bump_counters(&self, post_id: u64, delta: EngagementDelta) {
        self.update(move |s| s.bump_counters(post_id, &delta)).await;
    }

    pub async fn spawn_thread(&self, thread: ConversationThread) {
        self.update(move |s| s.spawn_thread(thread)).await;
    }

    pub async fn append_reply(&self, thread_id: Uuid, message: ChatMessage) -> bool {
        self.update(move |s| s.append_reply(thread_id, message))
            .await
            .unwrap_or(false)
    }

    pub async fn increment_stat(&self, kind: StatKind) {
        self.update(move |s| s.increment_stat(kind)).await;
    }

    pub async fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.update(move |s| s.set_status(status)).await;
    }

    pub async fn set_active_platform(&self, platform: Platform) -> bool {
        self.update(move |s| s.set_active_platform(platform))
            .await
            .unwrap_or(false)
    }

    /// Full copy of the current state. Still readable after close.
    pub async fn snapshot(&self) -> SimulationSnapshot {
        self.inner.lock().await.store.snapshot()
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Rejects every later mutation. Returns `false` if already closed.
    pub async fn close(&self) -> bool {
        {
            let mut guard = self.inner.lock().await;
            if guard.closed {
                return false;
            }
            guard.closed = true;
            // Queued events of a mutation that never got published are moot now.
            guard.store.take_events();
        }
        debug!("store closed");
        self.event_bus.publish(SimEvent::RunStopped).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreLimits;

    fn handle() -> StoreHandle {
        let store = SimulationStore::new(&StoreLimits::default(), vec![Platform::Threads]);
        StoreHandle::new(store, EventBus::new())
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let store = handle();
        let mut rx = store.event_bus().subscribe(Some(16)).await;

        store.append_log("Preparing content", LogCategory::Info).await;
        store.increment_stat(StatKind::PostsPublished).await;

        match rx.recv().await {
            Some(SimEvent::LogAppended(entry)) => assert_eq!(entry.message, "Preparing content"),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await {
            Some(SimEvent::StatsChanged(stats)) => assert_eq!(stats.posts_published, 1),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_store_ignores_mutations() {
        let store = handle();
        store.append_log("before", LogCategory::Info).await;
        assert!(store.close().await);
        assert!(!store.close().await);

        store.append_log("after", LogCategory::Info).await;
        store.increment_stat(StatKind::DmsReplied).await;
        store.bump_counters(1, EngagementDelta { likes: 3, ..Default::default() }).await;
        assert!(store.update(|_| ()).await.is_none());

        let snap = store.snapshot().await;
        assert_eq!(snap.logs.len(), 1);
        assert_eq!(snap.stats.dms_replied, 0);
        assert!(snap.engagement.is_empty());
        assert!(store.is_closed().await);
    }

    #[tokio::test]
    async fn test_full_subscriber_does_not_block_mutations() {
        let store = handle();
        let _stalled = store.event_bus().subscribe(Some(1)).await;

        let work = async {
            for i in 0..10 {
                store.append_log(format!("line {}", i), LogCategory::Info).await;
            }
            store.close().await
        };
        let closed = tokio::time::timeout(std::time::Duration::from_secs(1), work)
            .await
            .expect("mutations and close must not wait on a stalled reader");
        assert!(closed);
        assert_eq!(store.snapshot().await.logs.len(), 10);
    }

    #[tokio::test]
    async fn test_close_announces_run_stopped() {
        let store = handle();
        let mut rx = store.event_bus().subscribe(Some(4)).await;
        store.close().await;
        assert_eq!(rx.recv().await, Some(SimEvent::RunStopped));
    }
}
