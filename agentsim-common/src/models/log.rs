// File: agentsim-common/src/models/log.rs

use std::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Info,
    Success,
    Action,
    Dm,
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogCategory::Info => write!(f, "info"),
            LogCategory::Success => write!(f, "success"),
            LogCategory::Action => write!(f, "action"),
            LogCategory::Dm => write!(f, "dm"),
        }
    }
}

/// One line of the agent's terminal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: Uuid,
    /// Wall-clock `HH:MM:SS` at creation.
    pub time: String,
    pub message: String,
    pub category: LogCategory,
}
