use std::sync::atomic::AtomicBool;

use tracing::{debug, info};

use crate::{
    block::Block,
    clock::{Clock, SystemClock},
    config::MiningConfig,
    constants::GENESIS_PAYLOAD,
    error::{ChainViolation, Invariant, LedgerError, Result},
    pow::ProofOfWork,
};

/// Single-writer, append-only sequence of mined blocks.
///
/// Always holds a genesis block. Blocks are only ever added at the tail;
/// `&mut self` on the append methods keeps at most one append in flight.
#[derive(Clone, Debug)]
pub struct Chain<C: Clock = SystemClock> {
    blocks: Vec<Block>,
    pow: ProofOfWork,
    clock: C,
}

impl Chain<SystemClock> {
    /// Chain at the default difficulty, stamped with wall-clock time.
    pub fn new() -> Result<Self> {
        Self::with_config(MiningConfig::default(), SystemClock)
    }
}

impl<C: Clock> Chain<C> {
    pub fn with_config(config: MiningConfig, clock: C) -> Result<Self> {
        let pow = ProofOfWork::from_config(&config)?;
        let genesis = Block::genesis(clock.now(), &pow)?;
        info!(
            difficulty_bits = pow.difficulty_bits(),
            "chain created with genesis {}",
            hex::encode(genesis.hash())
        );
        Ok(Self {
            blocks: vec![genesis],
            pow,
            clock,
        })
    }

    /// Mines `payload` on top of the tip, stamped by the chain's clock.
    ///
    /// A clock reading earlier than the tip is raised to the tip's timestamp so
    /// timestamps never decrease along the chain.
    pub fn append(&mut self, payload: impl Into<Vec<u8>>) -> Result<&Block> {
        let timestamp = self.clock.now().max(self.tip().timestamp());
        self.push_mined(payload, timestamp, &AtomicBool::new(false))
    }

    /// Mines `payload` on top of the tip with a caller-chosen timestamp.
    pub fn append_at(&mut self, payload: impl Into<Vec<u8>>, timestamp: i64) -> Result<&Block> {
        let tip_timestamp = self.tip().timestamp();
        if timestamp < tip_timestamp {
            return Err(LedgerError::MalformedInput(format!(
                "timestamp {timestamp} precedes tip timestamp {tip_timestamp}"
            )));
        }
        self.push_mined(payload, timestamp, &AtomicBool::new(false))
    }

    /// Like [`append`](Self::append), aborting with [`LedgerError::Cancelled`]
    /// once `cancel` is raised. The chain is unchanged on any error.
    pub fn append_cancellable(
        &mut self,
        payload: impl Into<Vec<u8>>,
        cancel: &AtomicBool,
    ) -> Result<&Block> {
        let timestamp = self.clock.now().max(self.tip().timestamp());
        self.push_mined(payload, timestamp, cancel)
    }

    fn push_mined(
        &mut self,
        payload: impl Into<Vec<u8>>,
        timestamp: i64,
        cancel: &AtomicBool,
    ) -> Result<&Block> {
        let block = Block::mine_cancellable(
            payload,
            self.tip().hash(),
            timestamp,
            &self.pow,
            cancel,
        )?;
        debug!(height = self.blocks.len(), "appending block");
        self.blocks.push(block);
        Ok(self.tip())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn tip(&self) -> &Block {
        // never empty: constructed with genesis and only grows
        &self.blocks[self.blocks.len() - 1]
    }

    /// Index of the tip; 0 when only genesis exists.
    pub fn height(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn engine(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn verify(&self) -> std::result::Result<(), ChainViolation> {
        verify_blocks(&self.blocks, &self.pow)
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }
}

impl<'a, C: Clock> IntoIterator for &'a Chain<C> {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Walks `blocks` in order and reports the first broken invariant.
///
/// Per block the checks run genesis shape (index 0 only), content binding,
/// puzzle satisfaction, then linkage to the previous block.
pub fn verify_blocks(
    blocks: &[Block],
    pow: &ProofOfWork,
) -> std::result::Result<(), ChainViolation> {
    let violation = |index, invariant| ChainViolation { index, invariant };

    if blocks.is_empty() {
        return Err(violation(0, Invariant::Genesis));
    }

    for (index, block) in blocks.iter().enumerate() {
        if index == 0 && (!block.is_genesis() || block.payload() != GENESIS_PAYLOAD) {
            return Err(violation(index, Invariant::Genesis));
        }
        if pow.header_hash(&block.template(), block.nonce()) != *block.hash() {
            return Err(violation(index, Invariant::ContentBinding));
        }
        if !pow.is_below_target(block.hash()) {
            return Err(violation(index, Invariant::PuzzleSatisfaction));
        }
        if index > 0 && block.prev_hash() != &blocks[index - 1].hash()[..] {
            return Err(violation(index, Invariant::Linkage));
        }
    }
    Ok(())
}
