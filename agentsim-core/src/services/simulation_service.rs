// File: agentsim-core/src/services/simulation_service.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use uuid::Uuid;

use agentsim_common::models::post::{distinct_platforms, validate_drafts};
use agentsim_common::models::{EngagementCounters, Platform, PostDraft, SimulationSnapshot};
use agentsim_common::traits::RandomSource;

use crate::config::SimulationConfig;
use crate::eventbus::EventBus;
use crate::random::SeededRandom;
use crate::roster::Roster;
use crate::store::{SimulationStore, StoreHandle};
use crate::tasks::{
    spawn_conversation_task, spawn_engagement_task, spawn_publication_task, ConversationSpawner,
    EngagementTicker, PublicationPlan,
};
use crate::Error;

/// One independent draw stream per randomized task.
pub struct RandomSources {
    pub engagement: Box<dyn RandomSource>,
    pub conversations: Box<dyn RandomSource>,
}

impl RandomSources {
    /// Seeded streams when `seed` is given (the two tasks get distinct
    /// seeds), OS entropy otherwise.
    pub fn seeded(seed: Option<u64>) -> Self {
        Self {
            engagement: Box::new(SeededRandom::new(seed)),
            conversations: Box::new(SeededRandom::new(seed.map(|s| s.wrapping_add(1)))),
        }
    }
}

/// A running simulation: the store plus every task scheduled against it.
/// Dropping the run cancels its tasks; `stop` also waits for them.
pub struct SimulationRun {
    run_id: Uuid,
    posts: Arc<Vec<PostDraft>>,
    store: StoreHandle,
    event_bus: EventBus,
    tracker: TaskTracker,
    cancel: CancellationToken,
    publication_delay: Duration,
}

impl SimulationRun {
    /// Starts a run on the current tokio runtime.
    pub fn start(
        posts: Vec<PostDraft>,
        config: &SimulationConfig,
        roster: Roster,
        seed: Option<u64>,
    ) -> Result<Self, Error> {
        Self::start_with_sources(posts, config, roster, RandomSources::seeded(seed))
    }

    pub fn start_with_sources(
        posts: Vec<PostDraft>,
        config: &SimulationConfig,
        roster: Roster,
        sources: RandomSources,
    ) -> Result<Self, Error> {
        config.validate()?;
        roster.validate()?;
        validate_drafts(&posts)?;

        let run_id = Uuid::new_v4();
        let platforms = distinct_platforms(&posts);
        let mut state = SimulationStore::new(&config.limits, platforms.clone());
        for post in &posts {
            state.ensure_counters(post.id);
        }
        let event_bus = EventBus::new();
        let store = StoreHandle::new(state, event_bus.clone());

        let plan = PublicationPlan::build(&posts, &config.publication);
        let publication_delay = plan.total_delay;
        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();

        info!(
            "Starting simulation run {}: {} post(s) on {:?}, publication ends after {:?}",
            run_id,
            posts.len(),
            platforms,
            publication_delay
        );

        spawn_publication_task(&tracker, store.clone(), plan, cancel.child_token());

        let ticker = EngagementTicker::new(
            store.clone(),
            &posts,
            sources.engagement,
            config.engagement.clone(),
        );
        spawn_engagement_task(&tracker, ticker, cancel.child_token());

        let spawner = ConversationSpawner::new(
            store.clone(),
            sources.conversations,
            Arc::new(roster),
            platforms,
            config.conversations.clone(),
            publication_delay,
            tracker.clone(),
            cancel.child_token(),
        );
        spawn_conversation_task(&tracker, spawner);

        Ok(Self {
            run_id,
            posts: Arc::new(posts),
            store,
            event_bus,
            tracker,
            cancel,
            publication_delay,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn posts(&self) -> &[PostDraft] {
        &self.posts
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// When the last publish event fires (and the spawner gate starts counting down).
    pub fn publication_delay(&self) -> Duration {
        self.publication_delay
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn snapshot(&self) -> SimulationSnapshot {
        self.store.snapshot().await
    }

    pub async fn set_active_platform(&self, platform: Platform) -> bool {
        self.store.set_active_platform(platform).await
    }

    /// Posts on `platform` paired with their current counters, in input order.
    pub async fn feed(&self, platform: Platform) -> Vec<(PostDraft, EngagementCounters)> {
        let snapshot = self.store.snapshot().await;
        self.posts
            .iter()
            .filter(|p| p.platform == platform)
            .map(|p| (p.clone(), snapshot.counters_for(p.id)))
            .collect()
    }

    /// Cancels every task of the run, pending reply timers included, and
    /// waits for them to finish. Nothing mutates the store afterwards.
    pub async fn stop(self) -> SimulationSnapshot {
        info!("Stopping simulation run {}", self.run_id);
        self.cancel.cancel();
        self.store.close().await;
        self.tracker.close();
        self.tracker.wait().await;
        debug!(
            "Simulation run {} stopped; all tasks joined, {} subscriber(s) still attached.",
            self.run_id,
            self.event_bus.subscriber_count().await
        );
        self.store.snapshot().await
    }
}

impl Drop for SimulationRun {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns at most one run at a time. Starting a new run tears the previous one
/// down first, so nothing carries over between runs.
pub struct SimulationService {
    config: SimulationConfig,
    roster: Roster,
    current: Mutex<Option<SimulationRun>>,
}

impl SimulationService {
    pub fn new(config: SimulationConfig, roster: Roster) -> Result<Self, Error> {
        config.validate()?;
        roster.validate()?;
        Ok(Self {
            config,
            roster,
            current: Mutex::new(None),
        })
    }

    /// Returns the new run's id and its event bus.
    pub async fn start_run(
        &self,
        posts: Vec<PostDraft>,
        seed: Option<u64>,
    ) -> Result<(Uuid, EventBus), Error> {
        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            previous.stop().await;
        }
        let run = SimulationRun::start(posts, &self.config, self.roster.clone(), seed)?;
        let started = (run.run_id(), run.event_bus().clone());
        *current = Some(run);
        Ok(started)
    }

    /// Stops the current run, returning its final snapshot.
    pub async fn reset(&self) -> Option<SimulationSnapshot> {
        let run = self.current.lock().await.take()?;
        Some(run.stop().await)
    }

    pub async fn snapshot(&self) -> Result<SimulationSnapshot, Error> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(run) => Ok(run.snapshot().await),
            None => Err(Error::NotFound("no simulation run in progress".into())),
        }
    }

    pub async fn set_active_platform(&self, platform: Platform) -> Result<bool, Error> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(run) => Ok(run.set_active_platform(platform).await),
            None => Err(Error::NotFound("no simulation run in progress".into())),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.current.lock().await.is_some()
    }
}
