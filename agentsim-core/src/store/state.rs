// File: agentsim-core/src/store/state.rs

use std::collections::{BTreeMap, VecDeque};
use chrono::{Duration, Local};
use tracing::trace;
use uuid::Uuid;

use agentsim_common::models::{
    AggregateStats, ChatMessage, ConversationThread, EngagementCounters, EngagementDelta,
    LogCategory, LogEntry, Platform, SimulationSnapshot, StatKind,
};

use crate::config::StoreLimits;
use crate::eventbus::SimEvent;

pub const INITIAL_STATUS: &str = "Initializing Agent...";

/// All mutable state of one run: the capped log, per-post counters, the
/// capped thread list, aggregate stats and the status line.
///
/// Mutators queue a `SimEvent` into an outbox which the owning handle drains
/// and publishes once the lock is released.
#[derive(Debug)]
pub struct SimulationStore {
    logs: VecDeque<LogEntry>,
    log_capacity: usize,
    engagement: BTreeMap<u64, EngagementCounters>,
    /// Newest first.
    threads: VecDeque<ConversationThread>,
    thread_capacity: usize,
    stats: AggregateStats,
    status: String,
    platforms: Vec<Platform>,
    active_platform: Platform,
    outbox: Vec<SimEvent>,
}

impl SimulationStore {
    /// `platforms` are the distinct platforms of the run's drafts, first-seen
    /// order. The first one becomes the active platform (Instagram if none).
    pub fn new(limits: &StoreLimits, platforms: Vec<Platform>) -> Self {
        let active_platform = platforms.first().copied().unwrap_or(Platform::Instagram);
        Self {
            logs: VecDeque::with_capacity(limits.log_capacity),
            log_capacity: limits.log_capacity,
            engagement: BTreeMap::new(),
            threads: VecDeque::with_capacity(limits.thread_capacity),
            thread_capacity: limits.thread_capacity,
            stats: AggregateStats::default(),
            status: INITIAL_STATUS.to_string(),
            platforms,
            active_platform,
            outbox: Vec::new(),
        }
    }

    pub fn append_log(&mut self, message: impl Into<String>, category: LogCategory) -> LogEntry {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            time: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            category,
        };
        self.logs.push_back(entry.clone());
        while self.logs.len() > self.log_capacity {
            self.logs.pop_front();
        }
        self.outbox.push(SimEvent::LogAppended(entry.clone()));
        entry
    }

    /// Zeroed record for `post_id` unless one exists already.
    pub fn ensure_counters(&mut self, post_id: u64) {
        self.engagement.entry(post_id).or_default();
    }

    pub fn bump_counters(&mut self, post_id: u64, delta: &EngagementDelta) {
        self.engagement.entry(post_id).or_default().apply(delta);
    }

    /// Merges one engagement tick: every known post gets a record, active
    /// posts get their deltas. Emits nothing when no post was active.
    pub fn apply_engagement_tick(&mut self, known: &[u64], deltas: &[(u64, EngagementDelta)]) {
        for id in known {
            self.ensure_counters(*id);
        }
        if deltas.is_empty() {
            return;
        }
        for (id, delta) in deltas {
            self.bump_counters(*id, delta);
        }
        self.outbox.push(SimEvent::EngagementTicked { active_posts: deltas.len() });
    }

    pub fn spawn_thread(&mut self, thread: ConversationThread) {
        self.outbox.push(SimEvent::ThreadOpened {
            thread_id: thread.id,
            handle: thread.user_handle.clone(),
            platform: thread.platform,
        });
        self.threads.push_front(thread);
        self.threads.truncate(self.thread_capacity);
    }

    /// Appends the agent's reply and clears the typing flag. Returns `false`
    /// (and changes nothing) when the thread is gone.
    pub fn append_reply(&mut self, thread_id: Uuid, mut message: ChatMessage) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            trace!("append_reply: thread {} no longer listed", thread_id);
            return false;
        };
        // A reply is always strictly newer than what it answers.
        if let Some(last) = thread.messages.last() {
            if message.timestamp <= last.timestamp {
                message.timestamp = last.timestamp + Duration::microseconds(1);
            }
        }
        thread.last_updated = message.timestamp;
        thread.messages.push(message);
        thread.is_typing = false;
        self.outbox.push(SimEvent::ThreadReplied { thread_id });
        true
    }

    pub fn increment_stat(&mut self, kind: StatKind) {
        self.stats.increment(kind);
        self.outbox.push(SimEvent::StatsChanged(self.stats));
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.outbox.push(SimEvent::StatusChanged(self.status.clone()));
    }

    /// Switches the viewed platform. Platforms without drafts are ignored.
    pub fn set_active_platform(&mut self, platform: Platform) -> bool {
        if !self.platforms.contains(&platform) {
            return false;
        }
        if self.active_platform != platform {
            self.active_platform = platform;
            self.outbox.push(SimEvent::ActivePlatformChanged(platform));
        }
        true
    }

    pub fn active_platform(&self) -> Platform {
        self.active_platform
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter()
    }

    pub fn threads(&self) -> impl Iterator<Item = &ConversationThread> {
        self.threads.iter()
    }

    pub fn counters(&self, post_id: u64) -> Option<EngagementCounters> {
        self.engagement.get(&post_id).copied()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            logs: self.logs.iter().cloned().collect(),
            stats: self.stats,
            engagement: self.engagement.clone(),
            threads: self.threads.iter().cloned().collect(),
            status: self.status.clone(),
            active_platform: self.active_platform,
        }
    }

    pub(crate) fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }
}
