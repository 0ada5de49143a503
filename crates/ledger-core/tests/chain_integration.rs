mod helpers;

use helpers::{build_chain, test_config, TEST_DIFFICULTY, TEST_TIMESTAMP};
use ledger_core::{
    constants::GENESIS_PAYLOAD, hasher::count_leading_zero_bits, verify_blocks, Block, Chain,
    FixedClock, LedgerError, MiningConfig, ProofOfWork, SearchStrategy, U256,
};

#[test]
fn test_chain_linkage_and_validity() -> anyhow::Result<()> {
    let payloads = ["Send 0.1 BTC to jon", "Send 0.2 BTC to mike", "", "last"];
    let chain = build_chain(&payloads, SearchStrategy::Sequential);

    assert_eq!(chain.height(), payloads.len());
    assert!(chain.blocks()[0].prev_hash().is_empty());
    assert_eq!(chain.blocks()[0].payload(), GENESIS_PAYLOAD);

    let pow = chain.engine();
    let target = U256::ONE << (256 - TEST_DIFFICULTY);
    for (i, pair) in chain.blocks().windows(2).enumerate() {
        assert_eq!(pair[1].prev_hash(), &pair[0].hash()[..], "block {}", i + 1);
        assert_eq!(pair[1].payload(), payloads[i].as_bytes());
    }
    for block in &chain {
        assert!(pow.validate(&block.template(), block.nonce(), block.hash()));
        assert!(U256::from_be_bytes(*block.hash()) < target);
        assert!(count_leading_zero_bits(block.hash()) >= TEST_DIFFICULTY);
        assert_eq!(block.timestamp(), TEST_TIMESTAMP);
    }
    chain.verify()?;
    Ok(())
}

#[test]
fn test_chains_are_reproducible() {
    let a = build_chain(&["x", "y"], SearchStrategy::Sequential);
    let b = build_chain(&["x", "y"], SearchStrategy::Sequential);
    assert_eq!(a.blocks(), b.blocks());
}

#[test]
fn test_parallel_and_sequential_agree() {
    let payloads = ["alpha", "beta", "gamma", "delta"];
    let sequential = build_chain(&payloads, SearchStrategy::Sequential);
    let parallel = build_chain(&payloads, SearchStrategy::Parallel { workers: 3 });
    assert_eq!(sequential.blocks(), parallel.blocks());
}

#[test]
fn test_blocks_from_other_difficulty_fail_verification() {
    let chain = build_chain(&["a", "b"], SearchStrategy::Sequential);
    let stricter = ProofOfWork::new(TEST_DIFFICULTY + 1).unwrap();
    assert!(verify_blocks(chain.blocks(), &stricter).is_err());
}

#[test]
fn test_reference_scenario_at_four_bits() {
    let pow = ProofOfWork::new(4).unwrap();
    let a = Block::mine("A", &[], 0, &pow).unwrap();
    let b = Block::mine("B", &[], 0, &pow).unwrap();

    assert!(a.nonce() < 1_000);
    assert_eq!(a.hash()[0] & 0xF0, 0);
    assert!(pow.validate(&a.template(), a.nonce(), a.hash()));
    assert_ne!((a.nonce(), a.hash()), (b.nonce(), b.hash()));
}

#[test]
fn test_rejected_inputs_do_not_mine() {
    let pow = ProofOfWork::new(255).unwrap();
    let err = Block::mine("x", &[0u8; 16], 0, &pow).unwrap_err();
    assert!(matches!(err, LedgerError::MalformedInput(_)));
    assert!(err.to_string().contains("16"));
}

#[test]
fn test_exhaustion_is_an_error_not_a_hang() {
    let config = MiningConfig::default()
        .with_difficulty(255)
        .with_max_nonce(1_000);
    let err = Chain::with_config(config, FixedClock(0)).unwrap_err();
    assert!(matches!(err, LedgerError::EngineExhausted { attempts: 1_001 }));
}

#[test]
fn test_default_chain_uses_reference_difficulty() {
    let chain = Chain::new().unwrap();
    assert_eq!(chain.engine().difficulty_bits(), 16);
    assert!(count_leading_zero_bits(chain.tip().hash()) >= 16);
    assert!(chain.is_valid());
}

#[test]
fn test_system_clock_chain() -> anyhow::Result<()> {
    let mut chain = Chain::with_config(test_config(), ledger_core::SystemClock)?;
    let genesis_ts = chain.tip().timestamp();
    let block = chain.append("now")?;
    assert!(block.timestamp() >= genesis_ts);
    assert!(chain.is_valid());
    Ok(())
}
