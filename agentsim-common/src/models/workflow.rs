// File: agentsim-common/src/models/workflow.rs
//
// The finished output of the configuration wizard, plus the two helpers the
// planning step uses to turn it into a draft list.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::platform::Platform;
use crate::models::post::{PostDraft, PostType};

pub const MAX_POST_COUNT: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowType {
    #[default]
    #[serde(rename = "Plan Posts", alias = "PlanPosts")]
    PlanPosts,
}

/// Informational only; the simulation does not branch on it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentSource {
    #[default]
    #[serde(rename = "AI Generated", alias = "AiGenerated")]
    AiGenerated,
    Upload,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    #[serde(default)]
    pub workflow_type: WorkflowType,
    pub post_count: u32,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub content_source: ContentSource,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_description: String,
}

impl WorkflowConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.platforms.is_empty() {
            return Err(Error::Config("at least one platform must be selected".into()));
        }
        let mut seen = HashSet::new();
        for p in &self.platforms {
            if !seen.insert(*p) {
                return Err(Error::Config(format!("platform {} selected twice", p)));
            }
        }
        if self.post_count == 0 || self.post_count > MAX_POST_COUNT {
            return Err(Error::Config(format!(
                "post count must be between 1 and {}, got {}",
                MAX_POST_COUNT, self.post_count
            )));
        }
        Ok(())
    }

    pub fn primary_platform(&self) -> Platform {
        self.platforms.first().copied().unwrap_or(Platform::Instagram)
    }
}

/// Blank drafts the planning step starts from: ids `1..=post_count`, all on
/// the primary platform.
pub fn create_empty_drafts(config: &WorkflowConfig) -> Vec<PostDraft> {
    let platform = config.primary_platform();
    (1..=u64::from(config.post_count))
        .map(|id| PostDraft::new(id, platform, ""))
        .collect()
}

/// Cross-posts every draft to each other configured platform. Clones get
/// fresh ids after the current maximum; video-first platforms get reels.
pub fn expand_cross_posts(config: &WorkflowConfig, drafts: Vec<PostDraft>) -> Vec<PostDraft> {
    if config.platforms.is_empty() {
        return drafts;
    }

    let mut next_id = drafts.iter().map(|d| d.id).max().unwrap_or(0) + 1;
    let mut expanded = Vec::with_capacity(drafts.len() * config.platforms.len());

    for original in drafts {
        let clones: Vec<PostDraft> = config
            .platforms
            .iter()
            .filter(|target| **target != original.platform)
            .map(|target| {
                let mut clone = original.clone();
                clone.id = next_id;
                next_id += 1;
                clone.platform = *target;
                if target.is_video_first() {
                    clone.post_type = PostType::Reel;
                }
                clone
            })
            .collect();
        expanded.push(original);
        expanded.extend(clones);
    }
    expanded
}
