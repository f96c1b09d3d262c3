//! Injected randomness for placement and tie-breaking

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform integers in `[0, n)`.
///
/// Every random draw the engine makes goes through this trait, so a fixed seed
/// reproduces a run exactly.
pub trait RandomSource {
    /// Uniform integer in `[0, n)`; `n` is never zero
    fn below(&mut self, n: usize) -> usize;
}

/// Seedable ChaCha8 generator
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed drawn from the thread RNG; recoverable via `seed()`
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}
