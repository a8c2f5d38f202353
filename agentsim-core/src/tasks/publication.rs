// File: agentsim-core/src/tasks/publication.rs
//
// Walks the draft list once: prepare, upload and publish per post on a fully
// serialized schedule, then announces steady-state monitoring.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use agentsim_common::models::{LogCategory, Platform, PostDraft, StatKind};

use crate::config::PublicationTiming;
use crate::store::StoreHandle;

pub const TOPIC_PREVIEW_CHARS: usize = 15;
pub const MONITORING_STATUS: &str = "Monitoring Inbox & Engagement...";
pub const MONITORING_LOG: &str = "All posts live. Listening for interactions...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Prepare {
        post_id: u64,
        platform: Platform,
        topic_preview: String,
    },
    Upload {
        post_id: u64,
        platform: Platform,
    },
    Publish {
        post_id: u64,
        platform: Platform,
    },
    /// Fires once after the last post's publish event.
    Monitoring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStage {
    /// Offset from the start of the run.
    pub offset: Duration,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationPlan {
    pub stages: Vec<ScheduledStage>,
    /// Cumulative delay after which the run is in steady state. Also the
    /// conversation spawner's gate.
    pub total_delay: Duration,
}

impl PublicationPlan {
    /// Lays the stages out back to back. An empty draft list skips the
    /// warm-up and goes straight to monitoring.
    pub fn build(posts: &[PostDraft], timing: &PublicationTiming) -> Self {
        if posts.is_empty() {
            return Self {
                stages: vec![ScheduledStage { offset: Duration::ZERO, stage: Stage::Monitoring }],
                total_delay: Duration::ZERO,
            };
        }

        let mut stages = Vec::with_capacity(posts.len() * 3 + 1);
        let mut delay_ms = timing.warmup_ms;
        for post in posts {
            stages.push(ScheduledStage {
                offset: Duration::from_millis(delay_ms),
                stage: Stage::Prepare {
                    post_id: post.id,
                    platform: post.platform,
                    topic_preview: post.topic_preview(TOPIC_PREVIEW_CHARS),
                },
            });
            delay_ms += timing.upload_after_ms;

            stages.push(ScheduledStage {
                offset: Duration::from_millis(delay_ms),
                stage: Stage::Upload { post_id: post.id, platform: post.platform },
            });
            delay_ms += timing.publish_after_ms;

            stages.push(ScheduledStage {
                offset: Duration::from_millis(delay_ms),
                stage: Stage::Publish { post_id: post.id, platform: post.platform },
            });
            delay_ms += timing.cooldown_ms;
        }

        let total_delay = Duration::from_millis(delay_ms);
        stages.push(ScheduledStage { offset: total_delay, stage: Stage::Monitoring });
        Self { stages, total_delay }
    }
}

/// Commits one stage. Each stage is a single store update, so a publish log
/// line and its counter increment are never observed apart.
pub async fn apply_stage(store: &StoreHandle, stage: &Stage) {
    match stage.clone() {
        Stage::Prepare { post_id, platform, topic_preview } => {
            store
                .update(move |s| {
                    s.set_status(format!("[{}] Publishing: {}...", platform, topic_preview));
                    let message = if topic_preview.is_empty() {
                        format!("Preparing content for {} (ID: {})...", platform, post_id)
                    } else {
                        format!(
                            "Preparing content for {} (ID: {}): {}...",
                            platform, post_id, topic_preview
                        )
                    };
                    s.append_log(message, LogCategory::Info);
                })
                .await;
        }
        Stage::Upload { platform, .. } => {
            store
                .append_log(format!("Uploading media to {} servers...", platform), LogCategory::Action)
                .await;
        }
        Stage::Publish { post_id, platform } => {
            store
                .update(move |s| {
                    s.append_log(format!("✅ Published to {}!", platform), LogCategory::Success);
                    s.increment_stat(StatKind::PostsPublished);
                })
                .await;
            debug!("post {} published to {}", post_id, platform);
        }
        Stage::Monitoring => {
            store
                .update(|s| {
                    s.set_status(MONITORING_STATUS);
                    s.append_log(MONITORING_LOG, LogCategory::Info);
                })
                .await;
        }
    }
}

/// Fires every stage of `plan` at its offset from now. Stops without
/// touching the store once `cancel` fires.
pub async fn run_publication(store: StoreHandle, plan: PublicationPlan, cancel: CancellationToken) {
    let start = Instant::now();
    info!(
        "Publication scheduler started: {} stage(s) over {:?}",
        plan.stages.len(),
        plan.total_delay
    );

    for scheduled in &plan.stages {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Publication scheduler cancelled before {:?}", scheduled.stage);
                return;
            }
            _ = sleep_until(start + scheduled.offset) => {}
        }
        apply_stage(&store, &scheduled.stage).await;
    }

    info!("Publication scheduler finished.");
}

pub fn spawn_publication_task(
    tracker: &TaskTracker,
    store: StoreHandle,
    plan: PublicationPlan,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tracker.spawn(run_publication(store, plan, cancel))
}
