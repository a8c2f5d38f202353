// File: agentsim-core/src/test_utils/helpers.rs

use agentsim_common::models::{Platform, PostDraft};
use agentsim_common::traits::RandomSource;

use crate::config::SimulationConfig;
use crate::eventbus::EventBus;
use crate::store::{SimulationStore, StoreHandle};

/// Replays a fixed list of draws, wrapping around at the end. An empty list
/// always yields `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// `count` drafts with ids `1..=count`, all on `platform`.
pub fn sample_posts(count: u64, platform: Platform) -> Vec<PostDraft> {
    (1..=count)
        .map(|id| PostDraft::new(id, platform, &format!("Seasonal special #{}", id)))
        .collect()
}

/// Fresh store for `posts` with default limits and its own bus.
pub fn store_for(posts: &[PostDraft]) -> StoreHandle {
    let platforms = agentsim_common::models::post::distinct_platforms(posts);
    let store = SimulationStore::new(&SimulationConfig::default().limits, platforms);
    StoreHandle::new(store, EventBus::new())
}
