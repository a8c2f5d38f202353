// File: agentsim-core/src/tasks/conversation.rs
//
// Once the publication phase is over, every tick either opens a simulated
// DM thread (with a delayed automated reply), logs an ambient like, or logs
// reach growth on the active platform.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace};
use uuid::Uuid;

use agentsim_common::models::{ChatMessage, ConversationThread, LogCategory, Platform, StatKind};
use agentsim_common::traits::{pick, RandomSource};

use crate::config::ConversationSettings;
use crate::roster::Roster;
use crate::store::StoreHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnerAction {
    /// Publication still running; the countdown was lowered to `remaining_ms`.
    Gated { remaining_ms: i64 },
    Conversation { thread_id: Uuid },
    /// A conversation was drawn but there is no platform (or roster entry)
    /// to build it from.
    SpawnSkipped,
    Interaction,
    ReachGrowth,
}

pub struct ConversationSpawner<R> {
    store: StoreHandle,
    rng: R,
    roster: Arc<Roster>,
    platforms: Vec<Platform>,
    settings: ConversationSettings,
    countdown_ms: i64,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl<R: RandomSource> ConversationSpawner<R> {
    /// `gate` is the publication plan's total delay. Reply timers are spawned
    /// on `tracker` under child tokens of `cancel`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: StoreHandle,
        rng: R,
        roster: Arc<Roster>,
        platforms: Vec<Platform>,
        settings: ConversationSettings,
        gate: Duration,
        tracker: TaskTracker,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            rng,
            roster,
            platforms,
            settings,
            countdown_ms: i64::try_from(gate.as_millis()).unwrap_or(i64::MAX),
            tracker,
            cancel,
        }
    }

    pub fn is_gated(&self) -> bool {
        self.countdown_ms > 0
    }

    pub async fn tick(&mut self) -> SpawnerAction {
        if self.countdown_ms > 0 {
            self.countdown_ms -= i64::try_from(self.settings.gate_step_ms).unwrap_or(i64::MAX);
            return SpawnerAction::Gated { remaining_ms: self.countdown_ms };
        }

        let r = self.rng.roll();
        if r > self.settings.spawn_threshold {
            self.open_conversation().await
        } else if r > self.settings.interaction_threshold {
            let user = pick(&mut self.rng, &self.roster.ambient_users)
                .cloned()
                .unwrap_or_default();
            self.store
                .append_log(format!("❤️ Liked comment by {}", user), LogCategory::Action)
                .await;
            SpawnerAction::Interaction
        } else {
            // Active platform is read at commit time; the viewer may have switched.
            self.store
                .update(|s| {
                    let platform = s.active_platform();
                    s.append_log(format!("📈 Reach growing on {}...", platform), LogCategory::Info);
                })
                .await;
            SpawnerAction::ReachGrowth
        }
    }

    async fn open_conversation(&mut self) -> SpawnerAction {
        if self.platforms.is_empty() {
            debug!("No platform to attribute a conversation to; skipping.");
            return SpawnerAction::SpawnSkipped;
        }
        let Some(counterpart) = pick(&mut self.rng, &self.roster.counterparts).cloned() else {
            return SpawnerAction::SpawnSkipped;
        };
        let Some(platform) = pick(&mut self.rng, &self.platforms).copied() else {
            return SpawnerAction::SpawnSkipped;
        };
        let opener = pick(&mut self.rng, &self.roster.openers).cloned().unwrap_or_default();
        let reply = pick(&mut self.rng, &self.roster.replies).cloned().unwrap_or_default();

        let thread = ConversationThread::open(
            &counterpart.name,
            &counterpart.handle,
            &counterpart.avatar_color,
            platform,
            &opener,
        );
        let thread_id = thread.id;
        let handle = counterpart.handle.clone();

        let committed = self
            .store
            .update(move |s| {
                s.spawn_thread(thread);
                s.append_log(format!("📩 New DM from {} on {}", handle, platform), LogCategory::Dm);
            })
            .await;
        if committed.is_none() {
            return SpawnerAction::SpawnSkipped;
        }

        self.schedule_reply(thread_id, counterpart.handle, reply);
        SpawnerAction::Conversation { thread_id }
    }

    fn schedule_reply(&self, thread_id: Uuid, handle: String, reply: String) {
        let store = self.store.clone();
        let cancel = self.cancel.child_token();
        let delay = self.settings.reply_delay();
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    trace!("reply to {} cancelled", handle);
                }
                _ = sleep(delay) => {
                    deliver_reply(&store, thread_id, &handle, &reply).await;
                }
            }
        });
    }

    pub async fn run(mut self) {
        let cancel = self.cancel.clone();
        let period = self.settings.period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(
            "Conversation spawner started: gate {}ms, period {:?}",
            self.countdown_ms, period
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Conversation spawner cancelled.");
                    break;
                }
                _ = ticker.tick() => {
                    let action = self.tick().await;
                    trace!("spawner tick: {:?}", action);
                }
            }
        }
    }
}

/// Posts the agent's reply into `thread_id`. If the thread was evicted (or
/// the store closed) nothing happens: no message, no counter, no log line.
pub async fn deliver_reply(store: &StoreHandle, thread_id: Uuid, handle: &str, reply: &str) -> bool {
    let message = ChatMessage::from_agent(reply);
    let log_line = format!("↩️ Replied to {}", handle);
    let delivered = store
        .update(move |s| {
            if !s.append_reply(thread_id, message) {
                return false;
            }
            s.increment_stat(StatKind::DmsReplied);
            s.append_log(log_line, LogCategory::Action);
            true
        })
        .await
        .unwrap_or(false);

    if !delivered {
        debug!("Reply to {} dropped; thread {} is gone.", handle, thread_id);
    }
    delivered
}

pub fn spawn_conversation_task<R>(
    tracker: &TaskTracker,
    spawner: ConversationSpawner<R>,
) -> JoinHandle<()>
where
    R: RandomSource + 'static,
{
    tracker.spawn(spawner.run())
}
