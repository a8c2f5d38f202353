// File: agentsim-core/src/config.rs
//
// Timing, probability and capacity constants for one simulation run. Every
// field has a default, so a config file only needs the values it overrides.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub publication: PublicationTiming,
    pub engagement: EngagementSettings,
    pub conversations: ConversationSettings,
    pub limits: StoreLimits,
}

/// Offsets of the three publication stages. A post's prepare event fires at
/// the running offset, upload `upload_after_ms` later, publish
/// `publish_after_ms` after upload, and the next post starts `cooldown_ms`
/// after publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationTiming {
    pub warmup_ms: u64,
    pub upload_after_ms: u64,
    pub publish_after_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for PublicationTiming {
    fn default() -> Self {
        Self {
            warmup_ms: 1000,
            upload_after_ms: 800,
            publish_after_ms: 1200,
            cooldown_ms: 500,
        }
    }
}

impl PublicationTiming {
    pub fn stride_ms(&self) -> u64 {
        self.upload_after_ms + self.publish_after_ms + self.cooldown_ms
    }
}

/// A post is active on a tick when its draw exceeds `activity_threshold`;
/// the secondary counters grow when their own draw exceeds their threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementSettings {
    pub period_ms: u64,
    pub activity_threshold: f64,
    pub min_likes: u64,
    pub max_likes: u64,
    pub comment_threshold: f64,
    pub share_threshold: f64,
    pub save_threshold: f64,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            period_ms: 800,
            activity_threshold: 0.4,
            min_likes: 1,
            max_likes: 5,
            comment_threshold: 0.85,
            share_threshold: 0.95,
            save_threshold: 0.92,
        }
    }
}

/// Spawner tick draws `r`: `r > spawn_threshold` opens a conversation,
/// `r > interaction_threshold` logs an ambient like, anything else logs reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    pub period_ms: u64,
    pub gate_step_ms: u64,
    pub reply_delay_ms: u64,
    pub spawn_threshold: f64,
    pub interaction_threshold: f64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            period_ms: 2500,
            gate_step_ms: 2000,
            reply_delay_ms: 2500,
            spawn_threshold: 0.6,
            interaction_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLimits {
    pub log_capacity: usize,
    pub thread_capacity: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            log_capacity: 50,
            thread_capacity: 8,
        }
    }
}

impl EngagementSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl ConversationSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.engagement.period_ms == 0 {
            return Err(Error::Config("engagement.period_ms must be positive".into()));
        }
        if self.conversations.period_ms == 0 {
            return Err(Error::Config("conversations.period_ms must be positive".into()));
        }
        if self.conversations.gate_step_ms == 0 {
            return Err(Error::Config(
                "conversations.gate_step_ms must be positive, or the spawner never opens".into(),
            ));
        }
        if self.engagement.min_likes > self.engagement.max_likes {
            return Err(Error::Config(format!(
                "engagement like range {}..={} is empty",
                self.engagement.min_likes, self.engagement.max_likes
            )));
        }
        if self.limits.log_capacity == 0 || self.limits.thread_capacity == 0 {
            return Err(Error::Config("store capacities must be positive".into()));
        }

        let thresholds = [
            ("engagement.activity_threshold", self.engagement.activity_threshold),
            ("engagement.comment_threshold", self.engagement.comment_threshold),
            ("engagement.share_threshold", self.engagement.share_threshold),
            ("engagement.save_threshold", self.engagement.save_threshold),
            ("conversations.spawn_threshold", self.conversations.spawn_threshold),
            ("conversations.interaction_threshold", self.conversations.interaction_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if self.conversations.interaction_threshold > self.conversations.spawn_threshold {
            return Err(Error::Config(
                "conversations.interaction_threshold must not exceed spawn_threshold".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.publication.stride_ms(), 2500);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "engagement": { "period_ms": 100 } }"#).unwrap();
        assert_eq!(config.engagement.period_ms, 100);
        assert_eq!(config.engagement.max_likes, 5);
        assert_eq!(config.limits.log_capacity, 50);
        assert_eq!(config.conversations.reply_delay_ms, 2500);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.engagement.comment_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SimulationConfig::default();
        config.conversations.period_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.engagement.min_likes = 6;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.limits.thread_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_gate_step() {
        let mut config = SimulationConfig::default();
        config.conversations.gate_step_ms = 0;
        assert!(matches!(config.validate(), Err(Error::Config(msg)) if msg.contains("gate_step_ms")));
    }
}
