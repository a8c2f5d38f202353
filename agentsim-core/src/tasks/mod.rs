// File: agentsim-core/src/tasks/mod.rs
//
// Background tasks of a simulation run. They never call each other; all
// communication goes through the shared store.

pub mod publication;
pub mod engagement;
pub mod conversation;

pub use publication::{spawn_publication_task, PublicationPlan, ScheduledStage, Stage};
pub use engagement::{draw_engagement, spawn_engagement_task, EngagementTicker};
pub use conversation::{deliver_reply, spawn_conversation_task, ConversationSpawner, SpawnerAction};
