pub const BYTE: usize = 8;
pub const HASH_SIZE: usize = 32;
pub const HASH_BITS: u32 = (HASH_SIZE * BYTE) as u32;
pub const DEFAULT_DIFFICULTY_BITS: u32 = 16;
pub const GENESIS_PAYLOAD: &[u8] = b"Genesis Block";
/// Nonces handed to each worker per batch in the parallel search.
pub const PARALLEL_SHARD_SPAN: u64 = 4096;
