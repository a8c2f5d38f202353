// File: agentsim-common/src/traits/mod.rs
pub mod random;

pub use random::{pick, RandomSource};
