//! Random Move Reversi Player
//!
//! Picks uniformly among the legal moves of the side to move. Useful for:
//! - Exercising the arena end to end without an external engine installed
//! - Baseline comparisons (any real engine should easily beat this)

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use reversi_core::{Position, Square};


/// A Reversi player that plays random legal moves.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible move sequence for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A random legal move for the side to move, or None when it must pass.
    pub fn choose(&mut self, pos: &Position) -> Option<Square> {
        pos.legal_moves().choose(&mut self.rng)
    }

    pub fn name(&self) -> &str {
        "Random"
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}
