//! Six-sided die.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of die rolls. Every roll is in `1..=6`.
pub trait DiceRoller {
    fn roll(&mut self) -> u8;
}

/// A fair six-sided die
pub struct Die {
    rng: StdRng,
}

impl Die {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic die for replays and tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Die {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for Die {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}
