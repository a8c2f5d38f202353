// File: agentsim-common/src/models/stats.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateStats {
    pub posts_published: u64,
    pub dms_replied: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    PostsPublished,
    DmsReplied,
}

impl AggregateStats {
    pub fn increment(&mut self, kind: StatKind) {
        match kind {
            StatKind::PostsPublished => self.posts_published += 1,
            StatKind::DmsReplied => self.dms_replied += 1,
        }
    }
}
