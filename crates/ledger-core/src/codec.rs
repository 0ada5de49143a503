//! Canonical byte layout of a block header.
//!
//! Fields are concatenated without length prefixes or delimiters. Only the
//! payload is variable-width, so the layout stays unambiguous as long as every
//! producer and verifier rebuilds it from the same typed fields. Adding a second
//! variable-width field requires length prefixes.

const INT_SIZE: usize = 8;

/// Header bytes fed to the hasher during mining and validation:
/// `timestamp | payload | prev_hash | difficulty_bits | nonce`, integers as
/// 8-byte big-endian.
pub fn canonical_header(
    timestamp: i64,
    payload: &[u8],
    prev_hash: &[u8],
    difficulty_bits: u32,
    nonce: u64,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(INT_SIZE * 3 + payload.len() + prev_hash.len());
    write_content(&mut bytes, timestamp, payload, prev_hash);
    bytes.extend_from_slice(&u64::from(difficulty_bits).to_be_bytes());
    bytes.extend_from_slice(&nonce.to_be_bytes());
    bytes
}

/// Plain block content without the puzzle fields: `timestamp | payload | prev_hash`.
pub fn content_header(timestamp: i64, payload: &[u8], prev_hash: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(INT_SIZE + payload.len() + prev_hash.len());
    write_content(&mut bytes, timestamp, payload, prev_hash);
    bytes
}

fn write_content(bytes: &mut Vec<u8>, timestamp: i64, payload: &[u8], prev_hash: &[u8]) {
    bytes.extend_from_slice(&timestamp.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(prev_hash);
}
