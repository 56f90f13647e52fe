use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the numbers returned by the `Rand` key
pub trait RandomSource: fmt::Debug {
    /// Returns a number uniformly distributed in `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic generator for a fixed seed, entropy-seeded otherwise
pub fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    }
}
