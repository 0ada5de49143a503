//! Append-only ledger of hash-linked blocks, admitted by proof of work.
//!
//! Every block commits to its predecessor's hash, and its own hash must fall
//! below a fixed difficulty target. [`Chain`] is the single writer;
//! [`ProofOfWork`] mines and verifies individual blocks.

pub mod block;
pub mod chain;
pub mod clock;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod pow;

pub type Hash = [u8; 32];

pub use block::{Block, BlockTemplate};
pub use chain::{verify_blocks, Chain};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{MiningConfig, SearchStrategy};
pub use error::{ChainViolation, Invariant, LedgerError, Result};
pub use ethnum::U256;
pub use pow::ProofOfWork;
