// File: agentsim-common/src/models/engagement.rs

use serde::{Deserialize, Serialize};

/// Per-post engagement. All four counters only ever grow during a run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngagementCounters {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
}

/// Partial increment merged into a post's counters. Unsigned, so a merge can
/// never lower a counter.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngagementDelta {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
}

impl EngagementDelta {
    pub fn is_empty(&self) -> bool {
        self.likes == 0 && self.comments == 0 && self.shares == 0 && self.saves == 0
    }
}

impl EngagementCounters {
    pub fn apply(&mut self, delta: &EngagementDelta) {
        self.likes = self.likes.saturating_add(delta.likes);
        self.comments = self.comments.saturating_add(delta.comments);
        self.shares = self.shares.saturating_add(delta.shares);
        self.saves = self.saves.saturating_add(delta.saves);
    }

    /// Contribution of this post to the headline engagement figure.
    /// Saves are deliberately not part of it.
    pub fn interactions(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// Compact counter label: `999`, `1.2K`, `3.4M`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
