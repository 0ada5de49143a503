//! Proof-of-work search and verification.
//!
//! A nonce solves the puzzle when the SHA-256 digest of the canonical header,
//! read as a 256-bit big-endian integer, is strictly below
//! `2^(256 - difficulty_bits)`. The search always yields the smallest such
//! nonce, whichever strategy walks the nonce space.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ethnum::U256;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    block::BlockTemplate,
    codec::canonical_header,
    config::{MiningConfig, SearchStrategy},
    constants::{HASH_BITS, PARALLEL_SHARD_SPAN},
    error::{LedgerError, Result},
    hasher::{hash_to_u256, sha256},
    Hash,
};

#[derive(Clone, Debug)]
pub struct ProofOfWork {
    difficulty_bits: u32,
    target: U256,
    max_nonce: u64,
    strategy: SearchStrategy,
}

impl ProofOfWork {
    /// Sequential engine over the full `u64` nonce space.
    pub fn new(difficulty_bits: u32) -> Result<Self> {
        Self::from_config(&MiningConfig::default().with_difficulty(difficulty_bits))
    }

    pub fn from_config(config: &MiningConfig) -> Result<Self> {
        let bits = config.difficulty_bits;
        if bits == 0 || bits >= HASH_BITS {
            return Err(LedgerError::InvalidDifficulty(bits));
        }
        Ok(Self {
            difficulty_bits: bits,
            target: U256::ONE << (HASH_BITS - bits),
            max_nonce: config.max_nonce,
            strategy: config.strategy,
        })
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    pub fn target(&self) -> U256 {
        self.target
    }

    pub fn max_nonce(&self) -> u64 {
        self.max_nonce
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Digest of the canonical header for `nonce`.
    pub fn header_hash(&self, template: &BlockTemplate<'_>, nonce: u64) -> Hash {
        sha256(&canonical_header(
            template.timestamp,
            template.payload,
            template.prev_hash,
            self.difficulty_bits,
            nonce,
        ))
    }

    pub fn is_below_target(&self, hash: &Hash) -> bool {
        hash_to_u256(hash) < self.target
    }

    /// Finds the smallest nonce whose header hash is below the target.
    pub fn search(&self, template: &BlockTemplate<'_>) -> Result<(u64, Hash)> {
        self.search_cancellable(template, &AtomicBool::new(false))
    }

    /// Same as [`search`](Self::search), but gives up with
    /// [`LedgerError::Cancelled`] once `cancel` is raised.
    pub fn search_cancellable(
        &self,
        template: &BlockTemplate<'_>,
        cancel: &AtomicBool,
    ) -> Result<(u64, Hash)> {
        debug!(
            difficulty_bits = self.difficulty_bits,
            payload_len = template.payload.len(),
            strategy = ?self.strategy,
            "searching for nonce"
        );

        let outcome = match self.strategy {
            SearchStrategy::Sequential => self.search_sequential(template, cancel),
            SearchStrategy::Parallel { workers } => {
                let workers = if workers == 0 {
                    rayon::current_num_threads()
                } else {
                    workers
                };
                self.search_parallel(template, workers.max(1) as u64, cancel)
            }
        };

        match &outcome {
            Ok((nonce, hash)) => debug!("Found nonce {} with hash {}", nonce, hex::encode(hash)),
            Err(err) => warn!("nonce search stopped: {err}"),
        }
        outcome
    }

    /// Recomputes the header hash for `nonce` and checks it against both the
    /// claimed hash and the target.
    pub fn validate(&self, template: &BlockTemplate<'_>, nonce: u64, claimed_hash: &Hash) -> bool {
        let hash = self.header_hash(template, nonce);
        hash == *claimed_hash && self.is_below_target(&hash)
    }

    fn search_sequential(
        &self,
        template: &BlockTemplate<'_>,
        cancel: &AtomicBool,
    ) -> Result<(u64, Hash)> {
        let mut nonce = 0u64;
        loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(LedgerError::Cancelled);
            }
            let hash = self.header_hash(template, nonce);
            if self.is_below_target(&hash) {
                return Ok((nonce, hash));
            }
            if nonce == self.max_nonce {
                return Err(self.exhausted());
            }
            nonce += 1;
        }
    }

    /// Walks the nonce space in batches of `workers * PARALLEL_SHARD_SPAN`.
    /// Each worker scans one contiguous shard of the batch and stops once its
    /// next nonce is not below the best hit so far, so lower shards still
    /// finish and the batch minimum wins.
    fn search_parallel(
        &self,
        template: &BlockTemplate<'_>,
        workers: u64,
        cancel: &AtomicBool,
    ) -> Result<(u64, Hash)> {
        let batch_len = workers.saturating_mul(PARALLEL_SHARD_SPAN);
        let mut batch_start = 0u64;

        loop {
            let batch_end = batch_start
                .saturating_add(batch_len - 1)
                .min(self.max_nonce);
            let best = AtomicU64::new(u64::MAX);
            let found = AtomicBool::new(false);

            (0..workers).into_par_iter().for_each(|shard| {
                let Some(start) = shard
                    .checked_mul(PARALLEL_SHARD_SPAN)
                    .and_then(|offset| batch_start.checked_add(offset))
                    .filter(|start| *start <= batch_end)
                else {
                    return;
                };
                let end = start.saturating_add(PARALLEL_SHARD_SPAN - 1).min(batch_end);

                let mut nonce = start;
                loop {
                    if cancel.load(Ordering::Relaxed)
                        || (found.load(Ordering::Acquire) && nonce >= best.load(Ordering::Acquire))
                    {
                        return;
                    }
                    if self.is_below_target(&self.header_hash(template, nonce)) {
                        best.fetch_min(nonce, Ordering::AcqRel);
                        found.store(true, Ordering::Release);
                        return;
                    }
                    if nonce == end {
                        return;
                    }
                    nonce += 1;
                }
            });

            if cancel.load(Ordering::Relaxed) {
                return Err(LedgerError::Cancelled);
            }
            if found.load(Ordering::Acquire) {
                let nonce = best.load(Ordering::Acquire);
                return Ok((nonce, self.header_hash(template, nonce)));
            }
            if batch_end == self.max_nonce {
                return Err(self.exhausted());
            }
            batch_start = batch_end + 1;
        }
    }

    fn exhausted(&self) -> LedgerError {
        LedgerError::EngineExhausted {
            attempts: u128::from(self.max_nonce) + 1,
        }
    }
}
