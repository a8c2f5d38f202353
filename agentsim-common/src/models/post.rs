// File: agentsim-common/src/models/post.rs

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::platform::Platform;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PostType {
    #[serde(rename = "Photo Post", alias = "PhotoPost")]
    PhotoPost,
    Reel,
    Carousel,
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostType::PhotoPost => write!(f, "Photo Post"),
            PostType::Reel => write!(f, "Reel"),
            PostType::Carousel => write!(f, "Carousel"),
        }
    }
}

impl FromStr for PostType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "photo post" | "photo-post" | "photopost" | "photo" => Ok(PostType::PhotoPost),
            "reel" => Ok(PostType::Reel),
            "carousel" => Ok(PostType::Carousel),
            _ => Err(format!("Unknown post type: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// Media attached to a draft. The URL is absent until the drafting step
/// generated or uploaded something.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct MediaRef {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: MediaKind,
}

/// A finished draft handed over by the drafting step. Read-only for the
/// simulation; only its engagement is derived.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub id: u64,
    pub platform: Platform,
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default = "default_post_type")]
    pub post_type: PostType,
    #[serde(default, alias = "generatedCaption")]
    pub caption: String,
    #[serde(default)]
    pub caption_starter: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub media: Option<MediaRef>,
    #[serde(default = "default_scheduled_time")]
    pub scheduled_time: String,
}

fn default_post_type() -> PostType {
    PostType::PhotoPost
}

fn default_scheduled_time() -> String {
    "10:00".to_string()
}

impl PostDraft {
    pub fn new(id: u64, platform: Platform, topic: &str) -> Self {
        Self {
            id,
            platform,
            topic: topic.to_string(),
            post_type: PostType::PhotoPost,
            caption: String::new(),
            caption_starter: String::new(),
            hashtags: Vec::new(),
            media: Some(MediaRef::default()),
            scheduled_time: default_scheduled_time(),
        }
    }

    /// First `max_chars` characters of the topic, cut on a char boundary.
    pub fn topic_preview(&self, max_chars: usize) -> String {
        self.topic.chars().take(max_chars).collect()
    }
}

/// Platforms present in `posts`, in the order they first appear.
pub fn distinct_platforms(posts: &[PostDraft]) -> Vec<Platform> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .map(|p| p.platform)
        .filter(|p| seen.insert(*p))
        .collect()
}

/// Rejects a draft list in which two drafts share an identifier.
pub fn validate_drafts(posts: &[PostDraft]) -> Result<(), Error> {
    let mut ids = HashSet::with_capacity(posts.len());
    for post in posts {
        if !ids.insert(post.id) {
            return Err(Error::DuplicatePost(post.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_platforms_keeps_first_seen_order() {
        let posts = vec![
            PostDraft::new(1, Platform::Threads, "a"),
            PostDraft::new(2, Platform::Instagram, "b"),
            PostDraft::new(3, Platform::Threads, "c"),
        ];
        assert_eq!(
            distinct_platforms(&posts),
            vec![Platform::Threads, Platform::Instagram]
        );
    }

    #[test]
    fn test_validate_drafts_rejects_duplicates() {
        let posts = vec![
            PostDraft::new(7, Platform::Threads, "a"),
            PostDraft::new(7, Platform::Instagram, "b"),
        ];
        match validate_drafts(&posts) {
            Err(Error::DuplicatePost(id)) => assert_eq!(id, 7),
            other => panic!("expected duplicate error, got {:?}", other),
        }
        assert!(validate_drafts(&[]).is_ok());
    }

    #[test]
    fn test_topic_preview_is_char_safe() {
        let post = PostDraft::new(1, Platform::Instagram, "Café crème brûlée weekend");
        assert_eq!(post.topic_preview(15), "Café crème brûl");
    }

    #[test]
    fn test_draft_deserializes_from_drafting_step_json() {
        let json = r##"{
            "id": 4,
            "platform": "YouTube Shorts",
            "topic": "Launch day",
            "type": "Reel",
            "generatedCaption": "We are live!",
            "hashtags": ["#launch"],
            "media": { "url": "https://cdn.example/v.mp4", "kind": "video" },
            "scheduledTime": "18:30"
        }"##;
        let draft: PostDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.platform, Platform::YouTubeShorts);
        assert_eq!(draft.post_type, PostType::Reel);
        assert_eq!(draft.caption, "We are live!");
        assert_eq!(draft.media.unwrap().kind, MediaKind::Video);
        assert_eq!(draft.scheduled_time, "18:30");
    }
}
