// File: agentsim-core/src/random.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use agentsim_common::traits::RandomSource;

/// `RandomSource` backed by a `StdRng`, reproducible when built from a seed.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn roll(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}
