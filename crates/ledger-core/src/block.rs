use std::sync::atomic::AtomicBool;

use serde::{ser::SerializeStruct, Serialize, Serializer};
use tracing::info;

use crate::{
    codec::content_header,
    constants::{GENESIS_PAYLOAD, HASH_SIZE},
    error::{LedgerError, Result},
    hasher::sha256,
    pow::ProofOfWork,
    Hash,
};

/// The fixed fields of a block being mined. The engine varies only the nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockTemplate<'a> {
    pub timestamp: i64,
    pub payload: &'a [u8],
    /// Empty for genesis, otherwise `HASH_SIZE` bytes.
    pub prev_hash: &'a [u8],
}

/// A mined block. Only obtainable through [`Block::mine`] or [`Block::genesis`],
/// and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub(crate) timestamp: i64,
    pub(crate) payload: Vec<u8>,
    pub(crate) prev_hash: Option<Hash>,
    pub(crate) hash: Hash,
    pub(crate) nonce: u64,
}

impl Block {
    /// Mines a block on top of `prev_hash` (empty for genesis).
    pub fn mine(
        payload: impl Into<Vec<u8>>,
        prev_hash: &[u8],
        timestamp: i64,
        pow: &ProofOfWork,
    ) -> Result<Self> {
        Self::mine_cancellable(payload, prev_hash, timestamp, pow, &AtomicBool::new(false))
    }

    pub fn mine_cancellable(
        payload: impl Into<Vec<u8>>,
        prev_hash: &[u8],
        timestamp: i64,
        pow: &ProofOfWork,
        cancel: &AtomicBool,
    ) -> Result<Self> {
        // Checked before searching so a bad link never costs a full mining run.
        let prev_hash = parse_prev_hash(prev_hash)?;
        let payload = payload.into();

        let template = BlockTemplate {
            timestamp,
            payload: &payload,
            prev_hash: prev_hash.as_ref().map_or(&[][..], |h| &h[..]),
        };
        let (nonce, hash) = pow.search_cancellable(&template, cancel)?;
        if !pow.validate(&template, nonce, &hash) {
            return Err(LedgerError::InternalFault(format!(
                "engine produced nonce {nonce} that fails validation"
            )));
        }

        info!(
            "Mined block with nonce {} and hash {}",
            nonce,
            hex::encode(hash)
        );

        Ok(Self {
            timestamp,
            payload,
            prev_hash,
            hash,
            nonce,
        })
    }

    /// First block of a chain: sentinel payload and no predecessor.
    pub fn genesis(timestamp: i64, pow: &ProofOfWork) -> Result<Self> {
        Self::mine(GENESIS_PAYLOAD, &[], timestamp, pow)
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Empty for the genesis block.
    pub fn prev_hash(&self) -> &[u8] {
        self.prev_hash.as_ref().map_or(&[][..], |h| &h[..])
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_none()
    }

    pub fn template(&self) -> BlockTemplate<'_> {
        BlockTemplate {
            timestamp: self.timestamp,
            payload: &self.payload,
            prev_hash: self.prev_hash(),
        }
    }

    /// Hash of `timestamp | payload | prev_hash`, without the puzzle fields.
    pub fn content_hash(&self) -> Hash {
        sha256(&content_header(
            self.timestamp,
            &self.payload,
            self.prev_hash(),
        ))
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Block", 6)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("data", &String::from_utf8_lossy(&self.payload))?;
        state.serialize_field("payload_hex", &hex::encode(&self.payload))?;
        state.serialize_field("prev_hash", &hex::encode(self.prev_hash()))?;
        state.serialize_field("hash", &hex::encode(self.hash))?;
        state.serialize_field("nonce", &self.nonce)?;
        state.end()
    }
}

fn parse_prev_hash(bytes: &[u8]) -> Result<Option<Hash>> {
    match bytes.len() {
        0 => Ok(None),
        HASH_SIZE => {
            let mut out = [0u8; HASH_SIZE];
            out.copy_from_slice(bytes);
            Ok(Some(out))
        }
        n => Err(LedgerError::MalformedInput(format!(
            "predecessor hash must be empty or {HASH_SIZE} bytes, got {n}"
        ))),
    }
}
