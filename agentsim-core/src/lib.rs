// agentsim-core/src/lib.rs

pub mod config;
pub mod eventbus;
pub mod random;
pub mod roster;
pub mod services;
pub mod store;
pub mod tasks;
pub mod test_utils;

pub use agentsim_common::error::Error;
pub use agentsim_common::models;
pub use config::SimulationConfig;
pub use roster::Roster;
pub use services::simulation_service::{SimulationRun, SimulationService};
