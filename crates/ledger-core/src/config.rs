//! Mining configuration threaded into the proof-of-work engine.
//!
//! Difficulty is never read from a global: every engine is built from a
//! `MiningConfig`, so tests and callers can pick their own.

use crate::constants::DEFAULT_DIFFICULTY_BITS;

/// How the nonce space is walked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// One nonce at a time on the calling thread.
    #[default]
    Sequential,
    /// Contiguous shards on a rayon pool. `workers == 0` uses the global pool size.
    Parallel { workers: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningConfig {
    /// Required leading zero bits; the target is `2^(256 - difficulty_bits)`.
    pub difficulty_bits: u32,
    /// Largest nonce tried before reporting exhaustion (inclusive).
    pub max_nonce: u64,
    pub strategy: SearchStrategy,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            max_nonce: u64::MAX,
            strategy: SearchStrategy::Sequential,
        }
    }
}

impl MiningConfig {
    pub fn with_difficulty(mut self, difficulty_bits: u32) -> Self {
        self.difficulty_bits = difficulty_bits;
        self
    }

    pub fn with_max_nonce(mut self, max_nonce: u64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
