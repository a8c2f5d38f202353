// File: agentsim-core/src/tasks/engagement.rs

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace};

use agentsim_common::models::{EngagementDelta, PostDraft};
use agentsim_common::traits::RandomSource;

use crate::config::EngagementSettings;
use crate::store::StoreHandle;

/// Draws one tick of engagement for `post_ids`, in order. Per post: one
/// activity draw, and for active posts a like draw followed by independent
/// comment, share and save draws. Inactive posts are left out.
pub fn draw_engagement<R>(
    rng: &mut R,
    post_ids: &[u64],
    settings: &EngagementSettings,
) -> Vec<(u64, EngagementDelta)>
where
    R: RandomSource + ?Sized,
{
    let mut deltas = Vec::new();
    for id in post_ids {
        if rng.roll() <= settings.activity_threshold {
            continue;
        }
        let likes = rng.roll_range(settings.min_likes, settings.max_likes);
        let comments = u64::from(rng.roll() > settings.comment_threshold);
        let shares = u64::from(rng.roll() > settings.share_threshold);
        let saves = u64::from(rng.roll() > settings.save_threshold);
        deltas.push((*id, EngagementDelta { likes, comments, shares, saves }));
    }
    deltas
}

/// Grows engagement for every known post on a fixed period, regardless of
/// whether the post has been published yet.
pub struct EngagementTicker<R> {
    store: StoreHandle,
    post_ids: Vec<u64>,
    rng: R,
    settings: EngagementSettings,
}

impl<R: RandomSource> EngagementTicker<R> {
    pub fn new(store: StoreHandle, posts: &[PostDraft], rng: R, settings: EngagementSettings) -> Self {
        Self {
            store,
            post_ids: posts.iter().map(|p| p.id).collect(),
            rng,
            settings,
        }
    }

    /// Runs one tick and returns how many posts were active.
    pub async fn tick(&mut self) -> usize {
        let deltas = draw_engagement(&mut self.rng, &self.post_ids, &self.settings);
        let active = deltas.len();
        let known = self.post_ids.clone();
        self.store
            .update(move |s| s.apply_engagement_tick(&known, &deltas))
            .await;
        active
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let period = self.settings.period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Engagement ticker started for {} post(s), period {:?}", self.post_ids.len(), period);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Engagement ticker cancelled.");
                    break;
                }
                _ = ticker.tick() => {
                    let active = self.tick().await;
                    trace!("engagement tick: {} active post(s)", active);
                }
            }
        }
    }
}

pub fn spawn_engagement_task<R>(
    tracker: &TaskTracker,
    ticker: EngagementTicker<R>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    R: RandomSource + 'static,
{
    tracker.spawn(ticker.run(cancel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::ScriptedRandom;

    #[test]
    fn test_inactive_post_consumes_one_draw() {
        // 0.4 is not above the threshold: skipped. Second post is active.
        let mut rng = ScriptedRandom::new(vec![0.4, 0.41, 0.99, 0.86, 0.96, 0.93]);
        let deltas = draw_engagement(&mut rng, &[1, 2], &EngagementSettings::default());
        assert_eq!(
            deltas,
            vec![(2, EngagementDelta { likes: 5, comments: 1, shares: 1, saves: 1 })]
        );
    }

    #[test]
    fn test_secondary_counters_respect_thresholds() {
        let mut rng = ScriptedRandom::new(vec![0.9, 0.0, 0.85, 0.95, 0.92]);
        let deltas = draw_engagement(&mut rng, &[7], &EngagementSettings::default());
        assert_eq!(
            deltas,
            vec![(7, EngagementDelta { likes: 1, comments: 0, shares: 0, saves: 0 })]
        );
    }
}
