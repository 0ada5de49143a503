use std::fmt;

use thiserror::Error;

/// The invariant a block broke during chain verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invariant {
    /// I1: stored hash does not match the recomputed header digest.
    ContentBinding,
    /// I2: predecessor hash does not match the previous block's hash.
    Linkage,
    /// I3: genesis block has a predecessor or the wrong sentinel payload.
    Genesis,
    /// I4: hash is not below the difficulty target.
    PuzzleSatisfaction,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invariant::ContentBinding => "content binding",
            Invariant::Linkage => "chain linkage",
            Invariant::Genesis => "genesis",
            Invariant::PuzzleSatisfaction => "puzzle satisfaction",
        };
        f.write_str(name)
    }
}

/// First violation found while walking a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("block {index} violates {invariant}")]
pub struct ChainViolation {
    pub index: usize,
    pub invariant: Invariant,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("nonce space exhausted after {attempts} attempts")]
    EngineExhausted { attempts: u128 },

    #[error("mining cancelled")]
    Cancelled,

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("difficulty must be between 1 and 255 bits, got {0}")]
    InvalidDifficulty(u32),

    #[error("internal fault: {0}")]
    InternalFault(String),

    #[error(transparent)]
    InvariantViolation(#[from] ChainViolation),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
