// File: agentsim-common/src/models/snapshot.rs

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::models::conversation::ConversationThread;
use crate::models::engagement::EngagementCounters;
use crate::models::log::LogEntry;
use crate::models::platform::Platform;
use crate::models::stats::AggregateStats;

/// Point-in-time copy of everything the presentation layer renders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulationSnapshot {
    /// Oldest first.
    pub logs: Vec<LogEntry>,
    pub stats: AggregateStats,
    pub engagement: BTreeMap<u64, EngagementCounters>,
    /// Newest first.
    pub threads: Vec<ConversationThread>,
    pub status: String,
    pub active_platform: Platform,
}

impl SimulationSnapshot {
    /// Likes + comments + shares over every post, computed on read.
    pub fn total_engagement(&self) -> u64 {
        self.engagement.values().map(|c| c.interactions()).sum()
    }

    pub fn threads_on(&self, platform: Platform) -> Vec<&ConversationThread> {
        self.threads.iter().filter(|t| t.platform == platform).collect()
    }

    pub fn counters_for(&self, post_id: u64) -> EngagementCounters {
        self.engagement.get(&post_id).copied().unwrap_or_default()
    }
}
