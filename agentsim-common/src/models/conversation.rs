// File: agentsim-common/src/models/conversation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::platform::Platform;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    /// `true` when written by the agent, `false` for the counterpart.
    pub is_agent: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_counterpart(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            is_agent: false,
            timestamp: Utc::now(),
        }
    }

    pub fn from_agent(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            is_agent: true,
            timestamp: Utc::now(),
        }
    }
}

/// A simulated inbound conversation. The first message is always from the
/// counterpart; the optional second one is the agent's reply.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConversationThread {
    pub id: Uuid,
    pub username: String,
    pub user_handle: String,
    pub avatar_color: String,
    pub platform: Platform,
    pub messages: Vec<ChatMessage>,
    /// The agent is composing a reply.
    pub is_typing: bool,
    pub last_updated: DateTime<Utc>,
}

impl ConversationThread {
    pub fn open(
        username: &str,
        user_handle: &str,
        avatar_color: &str,
        platform: Platform,
        opener: &str,
    ) -> Self {
        let first = ChatMessage::from_counterpart(opener);
        let last_updated = first.timestamp;
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            user_handle: user_handle.to_string(),
            avatar_color: avatar_color.to_string(),
            platform,
            messages: vec![first],
            is_typing: true,
            last_updated,
        }
    }

    pub fn has_agent_reply(&self) -> bool {
        self.messages.iter().any(|m| m.is_agent)
    }
}
