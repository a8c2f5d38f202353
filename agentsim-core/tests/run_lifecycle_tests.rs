// tests/run_lifecycle_tests.rs

use std::time::Duration;
use tokio::time::{sleep, timeout};

use agentsim_core::eventbus::SimEvent;
use agentsim_core::models::{Platform, PostDraft};
use agentsim_core::services::RandomSources;
use agentsim_core::test_utils::helpers::{sample_posts, ScriptedRandom};
use agentsim_core::{Error, Roster, SimulationConfig, SimulationRun, SimulationService};

fn always_spawn() -> RandomSources {
    RandomSources {
        engagement: Box::new(ScriptedRandom::new(vec![0.0])),
        conversations: Box::new(ScriptedRandom::new(vec![0.9, 0.0, 0.0, 0.0, 0.0])),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_in_flight_replies() -> Result<(), Error> {
    let posts = sample_posts(1, Platform::Instagram);
    let run = SimulationRun::start_with_sources(
        posts,
        &SimulationConfig::default(),
        Roster::default(),
        always_spawn(),
    )?;
    assert_eq!(run.publication_delay(), Duration::from_millis(3500));
    let store = run.store().clone();

    // Gated at 2500 and 5000, first conversation at 7500, its reply due at 10000.
    sleep(Duration::from_millis(8000)).await;
    let before = run.snapshot().await;
    assert_eq!(before.threads.len(), 1);
    assert!(before.threads[0].is_typing);

    let frozen = run.stop().await;
    assert_eq!(frozen, before);

    sleep(Duration::from_secs(10)).await;
    let after = store.snapshot().await;
    assert_eq!(after, frozen);
    assert_eq!(after.stats.dms_replied, 0);
    assert!(after.threads[0].is_typing);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_service_restart_starts_from_scratch() -> Result<(), Error> {
    let service = SimulationService::new(SimulationConfig::default(), Roster::default())?;
    assert!(!service.is_running().await);
    assert!(matches!(service.snapshot().await, Err(Error::NotFound(_))));

    let (first_id, _) = service.start_run(sample_posts(2, Platform::Instagram), Some(5)).await?;
    sleep(Duration::from_millis(3001)).await;
    let snap = service.snapshot().await?;
    assert_eq!(snap.stats.posts_published, 1);
    assert!(!snap.logs.is_empty());

    let (second_id, _) = service.start_run(sample_posts(1, Platform::Tiktok), Some(6)).await?;
    assert_ne!(first_id, second_id);
    let snap = service.snapshot().await?;
    assert_eq!(snap.stats.posts_published, 0);
    assert!(snap.logs.is_empty());
    assert!(snap.threads.is_empty());
    assert_eq!(snap.engagement.len(), 1);
    assert_eq!(snap.active_platform, Platform::Tiktok);

    assert!(service.set_active_platform(Platform::Tiktok).await?);
    assert!(!service.set_active_platform(Platform::Instagram).await?);

    let last = service.reset().await;
    assert!(last.is_some());
    assert!(!service.is_running().await);
    assert!(matches!(service.snapshot().await, Err(Error::NotFound(_))));
    assert!(service.reset().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_feed_filters_by_platform() -> Result<(), Error> {
    let posts = vec![
        PostDraft::new(1, Platform::Instagram, "Latte art"),
        PostDraft::new(2, Platform::Instagram, "New menu"),
        PostDraft::new(3, Platform::Tiktok, "Barista day"),
    ];
    let run = tokio_test::assert_ok!(SimulationRun::start(
        posts,
        &SimulationConfig::default(),
        Roster::default(),
        Some(9)
    ));

    let instagram = run.feed(Platform::Instagram).await;
    let ids: Vec<u64> = instagram.iter().map(|(p, _)| p.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let tiktok = run.feed(Platform::Tiktok).await;
    assert_eq!(tiktok.len(), 1);
    assert_eq!(tiktok[0].0.topic, "Barista day");
    assert!(run.feed(Platform::Threads).await.is_empty());

    run.stop().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_event_bus_streams_store_changes() -> Result<(), Error> {
    let posts = sample_posts(1, Platform::Instagram);
    let run = SimulationRun::start_with_sources(
        posts,
        &SimulationConfig::default(),
        Roster::default(),
        always_spawn(),
    )?;
    let mut rx = run.event_bus().subscribe(None).await;

    sleep(Duration::from_millis(1001)).await;
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::LogAppended(entry) if entry.message.starts_with("Preparing content for Instagram")
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::StatusChanged(status) if status.starts_with("[Instagram]"))));

    run.stop().await;
    let mut stopped = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, SimEvent::RunStopped) {
            stopped = true;
        }
    }
    assert!(stopped);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_undrained_subscriber_does_not_stall_the_run() -> Result<(), Error> {
    let posts = sample_posts(2, Platform::Instagram);
    let run = SimulationRun::start(posts, &SimulationConfig::default(), Roster::default(), Some(21))?;
    let _idle = run.event_bus().subscribe(Some(4)).await;

    sleep(Duration::from_secs(20)).await;
    let snap = run.snapshot().await;
    assert_eq!(snap.stats.posts_published, 2);
    assert!(snap.logs.len() >= 7);

    let stopped = timeout(Duration::from_secs(60), run.stop()).await;
    assert!(stopped.is_ok(), "stop must not wait on a full subscriber");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropping_a_run_cancels_its_tasks() -> Result<(), Error> {
    let posts = sample_posts(2, Platform::Instagram);
    let run = SimulationRun::start_with_sources(
        posts,
        &SimulationConfig::default(),
        Roster::default(),
        RandomSources {
            engagement: Box::new(ScriptedRandom::new(vec![0.9, 0.0, 0.0, 0.0, 0.0])),
            conversations: Box::new(ScriptedRandom::new(vec![0.9, 0.0, 0.0, 0.0, 0.0])),
        },
    )?;
    let store = run.store().clone();

    sleep(Duration::from_millis(2000)).await;
    drop(run);
    let at_drop = store.snapshot().await;
    assert_eq!(at_drop.logs.len(), 2);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(store.snapshot().await, at_drop);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_post_ids_are_rejected() {
    let posts = vec![
        PostDraft::new(1, Platform::Instagram, "One"),
        PostDraft::new(1, Platform::Threads, "Also one"),
    ];
    let result = SimulationRun::start(posts, &SimulationConfig::default(), Roster::default(), None);
    assert!(matches!(result, Err(Error::DuplicatePost(1))));
}
