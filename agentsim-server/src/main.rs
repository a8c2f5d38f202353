use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use agentsim_common::models::post::validate_drafts;
use agentsim_common::models::workflow::{create_empty_drafts, expand_cross_posts};
use agentsim_common::models::{ContentSource, Platform, PostDraft, WorkflowConfig, WorkflowType};
use agentsim_core::eventbus::SimEvent;
use agentsim_core::{Roster, SimulationConfig, SimulationRun};

mod render;

#[derive(Parser, Debug, Clone)]
#[command(name = "agentsim")]
#[command(author, version, about = "Simulated social-media agent: publishes drafts, tracks engagement, answers DMs")]
struct Args {
    /// JSON file with `{ "config": WorkflowConfig, "posts": [PostDraft] }`.
    /// When `posts` is missing, drafts are generated from the config.
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON file overriding the simulation timings and probabilities.
    #[arg(long)]
    sim_config: Option<PathBuf>,

    /// JSON file replacing the built-in counterpart/opener/reply tables.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Seed for reproducible runs. Falls back to AGENTSIM_SEED, then OS entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds; 0 runs until Ctrl-C.
    #[arg(long, default_value = "30")]
    duration_secs: u64,

    /// How often the feed/inbox dashboard is printed.
    #[arg(long, default_value = "5000")]
    render_interval_ms: u64,

    /// Platforms to publish on when no input file is given.
    #[arg(long, value_delimiter = ',', default_value = "instagram")]
    platforms: Vec<Platform>,

    /// Number of drafts to plan when no input file is given.
    #[arg(long, default_value = "3")]
    post_count: u32,

    #[arg(long, default_value = "Corner Cafe")]
    business_name: String,

    /// Topics assigned to generated drafts, cycled in order.
    #[arg(long, value_delimiter = ',')]
    topics: Vec<String>,

    /// Platform shown in the dashboard; defaults to the first one with posts.
    #[arg(long)]
    view: Option<Platform>,
}

#[derive(Debug, Deserialize)]
struct RunInput {
    config: WorkflowConfig,
    #[serde(default)]
    posts: Option<Vec<PostDraft>>,
}

const DEFAULT_TOPICS: [&str; 4] = [
    "Morning specials",
    "Behind the scenes",
    "Customer spotlight",
    "Weekend event",
];

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("agentsim=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).context("failed to set global subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();

    let config = match &args.sim_config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading simulation config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let roster = match &args.roster {
        Some(path) => Roster::from_json_file(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => Roster::default(),
    };
    let posts = load_posts(&args)?;
    let seed = args.seed.or_else(seed_from_env);

    info!(
        "agentsim starting: {} draft(s), seed={:?}, duration={}s",
        posts.len(),
        seed,
        args.duration_secs
    );

    let run = SimulationRun::start(posts, &config, roster, seed)?;
    if let Some(platform) = args.view {
        if !run.set_active_platform(platform).await {
            warn!("No drafts on {}; keeping the default view.", platform);
        }
    }

    let events = run.event_bus().subscribe(None).await;
    let printer = tokio::spawn(print_terminal(events));

    supervise(&run, &args).await;

    let final_snapshot = run.stop().await;
    let _ = printer.await;

    println!();
    println!("{}", render::header(&final_snapshot));
    info!("agentsim finished.");
    Ok(())
}

/// Prints the dashboard periodically until Ctrl-C or the configured duration.
async fn supervise(run: &SimulationRun, args: &Args) {
    let mut render_tick = interval(Duration::from_millis(args.render_interval_ms.max(1)));
    render_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; nothing to show yet.
    render_tick.tick().await;

    let deadline = async {
        if args.duration_secs == 0 {
            std::future::pending::<()>().await;
        } else {
            tokio::time::sleep(Duration::from_secs(args.duration_secs)).await;
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("Ctrl-C handler failed: {:?}", e);
                }
                info!("Ctrl-C received; stopping run {}.", run.run_id());
                break;
            }
            _ = &mut deadline => {
                info!("Duration elapsed; stopping run {}.", run.run_id());
                break;
            }
            _ = render_tick.tick() => {
                let snapshot = run.snapshot().await;
                let feed = run.feed(snapshot.active_platform).await;
                println!("\n{}\n", render::dashboard(&snapshot, &feed));
            }
        }
    }
}

async fn print_terminal(mut rx: mpsc::Receiver<SimEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            SimEvent::LogAppended(entry) => println!("{}", render::log_line(&entry)),
            SimEvent::RunStopped => break,
            _ => {}
        }
    }
}

fn seed_from_env() -> Option<u64> {
    let raw = std::env::var("AGENTSIM_SEED").ok()?;
    match raw.trim().parse() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!("Ignoring AGENTSIM_SEED={:?}: not an unsigned integer.", raw);
            None
        }
    }
}

fn load_posts(args: &Args) -> anyhow::Result<Vec<PostDraft>> {
    let (workflow, posts) = match &args.input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading input {}", path.display()))?;
            let input: RunInput = serde_json::from_str(&raw)
                .with_context(|| format!("parsing input {}", path.display()))?;
            (input.config, input.posts)
        }
        None => (
            WorkflowConfig {
                workflow_type: WorkflowType::PlanPosts,
                post_count: args.post_count,
                platforms: args.platforms.clone(),
                content_source: ContentSource::AiGenerated,
                business_name: args.business_name.clone(),
                business_description: String::new(),
            },
            None,
        ),
    };
    workflow.validate()?;

    let posts = match posts {
        Some(posts) => posts,
        None => {
            let mut drafts = create_empty_drafts(&workflow);
            fill_topics(&mut drafts, &args.topics, &workflow.business_name);
            expand_cross_posts(&workflow, drafts)
        }
    };
    validate_drafts(&posts)?;
    Ok(posts)
}

fn fill_topics(drafts: &mut [PostDraft], topics: &[String], business_name: &str) {
    for (i, draft) in drafts.iter_mut().enumerate() {
        draft.topic = match topics.get(i % topics.len().max(1)) {
            Some(topic) => topic.clone(),
            None => format!("{}: {}", business_name, DEFAULT_TOPICS[i % DEFAULT_TOPICS.len()]),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_topics_cycles_user_topics() {
        let mut drafts: Vec<PostDraft> =
            (1..=3).map(|id| PostDraft::new(id, Platform::Threads, "")).collect();
        fill_topics(&mut drafts, &["A".to_string(), "B".to_string()], "Shop");
        let topics: Vec<&str> = drafts.iter().map(|d| d.topic.as_str()).collect();
        assert_eq!(topics, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_fill_topics_falls_back_to_business_name() {
        let mut drafts = vec![PostDraft::new(1, Platform::Threads, "")];
        fill_topics(&mut drafts, &[], "Shop");
        assert_eq!(drafts[0].topic, "Shop: Morning specials");
    }

    #[test]
    fn test_run_input_without_posts() {
        let raw = r#"{ "config": { "postCount": 2, "platforms": ["Instagram", "Tiktok"] } }"#;
        let input: RunInput = serde_json::from_str(raw).unwrap();
        assert!(input.posts.is_none());
        assert_eq!(input.config.post_count, 2);
        assert_eq!(input.config.platforms, vec![Platform::Instagram, Platform::Tiktok]);
    }

    #[test]
    fn test_args_parse_platform_list() {
        let args = Args::parse_from(["agentsim", "--platforms", "instagram,tiktok", "--seed", "7"]);
        assert_eq!(args.platforms, vec![Platform::Instagram, Platform::Tiktok]);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.duration_secs, 30);
    }
}
