// File: agentsim-core/src/services/mod.rs
pub mod simulation_service;

pub use simulation_service::{RandomSources, SimulationRun, SimulationService};
