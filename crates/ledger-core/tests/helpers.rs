use ledger_core::{Chain, FixedClock, MiningConfig, SearchStrategy};

pub const TEST_DIFFICULTY: u32 = 8;
pub const TEST_TIMESTAMP: i64 = 1_700_000_000;

pub fn test_config() -> MiningConfig {
    MiningConfig::default().with_difficulty(TEST_DIFFICULTY)
}

pub fn build_chain(payloads: &[&str], strategy: SearchStrategy) -> Chain<FixedClock> {
    let mut chain = Chain::with_config(
        test_config().with_strategy(strategy),
        FixedClock(TEST_TIMESTAMP),
    )
    .expect("Failed to create chain");
    for payload in payloads {
        chain.append(*payload).expect("Failed to append block");
    }
    chain
}
