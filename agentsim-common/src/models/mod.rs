// File: agentsim-common/src/models/mod.rs
pub mod platform;
pub mod post;
pub mod engagement;
pub mod log;
pub mod conversation;
pub mod stats;
pub mod workflow;
pub mod snapshot;

pub use platform::Platform;
pub use post::{MediaKind, MediaRef, PostDraft, PostType};
pub use engagement::{EngagementCounters, EngagementDelta};
pub use log::{LogCategory, LogEntry};
pub use conversation::{ChatMessage, ConversationThread};
pub use stats::{AggregateStats, StatKind};
pub use workflow::{ContentSource, WorkflowConfig, WorkflowType};
pub use snapshot::SimulationSnapshot;
