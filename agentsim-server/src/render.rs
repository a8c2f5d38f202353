// File: agentsim-server/src/render.rs
//
// Plain-text renditions of the terminal, feed and inbox views.

use agentsim_common::models::engagement::format_count;
use agentsim_common::models::{
    ConversationThread, EngagementCounters, LogCategory, LogEntry, PostDraft, SimulationSnapshot,
};

const TOPIC_COLUMN: usize = 28;

fn category_tag(category: LogCategory) -> &'static str {
    match category {
        LogCategory::Info => "INFO",
        LogCategory::Success => " OK ",
        LogCategory::Action => " >> ",
        LogCategory::Dm => " DM ",
    }
}

/// One terminal line, e.g. `[10:00:01] [ OK ] ✅ Published to Instagram!`.
pub fn log_line(entry: &LogEntry) -> String {
    format!("[{}] [{}] {}", entry.time, category_tag(entry.category), entry.message)
}

pub fn header(snapshot: &SimulationSnapshot) -> String {
    format!(
        "== {} | viewing {} | published {} | DMs replied {} | engagement {} ==",
        snapshot.status,
        snapshot.active_platform,
        snapshot.stats.posts_published,
        snapshot.stats.dms_replied,
        format_count(snapshot.total_engagement()),
    )
}

pub fn feed_row(post: &PostDraft, counters: &EngagementCounters) -> String {
    let mut topic = post.topic_preview(TOPIC_COLUMN);
    if topic.is_empty() {
        topic = "(untitled)".to_string();
    }
    format!(
        "  #{:<3} {:<11} {:<28}  likes {:>6}  comments {:>6}  shares {:>6}  saves {:>6}",
        post.id,
        post.post_type.to_string(),
        topic,
        format_count(counters.likes),
        format_count(counters.comments),
        format_count(counters.shares),
        format_count(counters.saves),
    )
}

pub fn inbox_row(thread: &ConversationThread) -> String {
    let last = thread
        .messages
        .last()
        .map(|m| if m.is_agent { format!("you: {}", m.text) } else { m.text.clone() })
        .unwrap_or_default();
    let marker = if thread.is_typing { "typing..." } else { "" };
    format!("  {:<14} {:<16} {} {}", thread.user_handle, thread.username, last, marker)
        .trim_end()
        .to_string()
}

/// Full dashboard for the active platform.
pub fn dashboard(snapshot: &SimulationSnapshot, feed: &[(PostDraft, EngagementCounters)]) -> String {
    let mut out = vec![header(snapshot)];

    out.push(format!("Feed ({}):", snapshot.active_platform));
    if feed.is_empty() {
        out.push("  no posts on this platform".to_string());
    }
    out.extend(feed.iter().map(|(post, counters)| feed_row(post, counters)));

    let threads = snapshot.threads_on(snapshot.active_platform);
    out.push(format!("Inbox ({} conversation(s)):", threads.len()));
    out.extend(threads.into_iter().map(inbox_row));

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentsim_common::models::{AggregateStats, Platform};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn snapshot() -> SimulationSnapshot {
        let mut engagement = BTreeMap::new();
        engagement.insert(1, EngagementCounters { likes: 1200, comments: 30, shares: 4, saves: 2 });
        SimulationSnapshot {
            logs: vec![],
            stats: AggregateStats { posts_published: 1, dms_replied: 0 },
            engagement,
            threads: vec![ConversationThread::open(
                "Sarah Jenkins",
                "@sarah_j",
                "bg-pink-500",
                Platform::Instagram,
                "Love this!",
            )],
            status: "Monitoring Inbox & Engagement...".into(),
            active_platform: Platform::Instagram,
        }
    }

    #[test]
    fn test_log_line_carries_time_and_tag() {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            time: "10:00:01".into(),
            message: "✅ Published to Instagram!".into(),
            category: LogCategory::Success,
        };
        assert_eq!(log_line(&entry), "[10:00:01] [ OK ] ✅ Published to Instagram!");
    }

    #[test]
    fn test_dashboard_lists_feed_and_inbox() {
        let snap = snapshot();
        let post = PostDraft::new(1, Platform::Instagram, "Latte art");
        let counters = snap.counters_for(1);
        let text = dashboard(&snap, &[(post, counters)]);

        assert!(text.contains("engagement 1.2K"));
        assert!(text.contains("Latte art"));
        assert!(text.contains("likes   1.2K"));
        assert!(text.contains("Inbox (1 conversation(s)):"));
        assert!(text.contains("@sarah_j"));
        assert!(text.contains("typing..."));
    }

    #[test]
    fn test_empty_feed_is_called_out() {
        let mut snap = snapshot();
        snap.threads.clear();
        let text = dashboard(&snap, &[]);
        assert!(text.contains("no posts on this platform"));
        assert!(text.contains("Inbox (0 conversation(s)):"));
    }
}
