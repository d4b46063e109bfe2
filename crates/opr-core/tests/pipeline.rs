//! Feed -> record -> encode -> score -> mine -> entry.

use opr_core::asset::PRICE_SCALE;
use opr_core::{
    mine_batch, random_address, validate_address, Asset, DifficultyScorer, FeedError,
    MinerConfig, PriceRecord, RECORD_SIZE,
};

fn feed(asset: Asset) -> Result<u64, FeedError> {
    Ok((asset.index() as u64 + 1) * PRICE_SCALE / 4)
}

fn config() -> MinerConfig {
    MinerConfig::from_json(
        r#"{
            "coinbase_address": "FA3VAprcnL8pdgDmoSvJbMjsX4DoHx814jeen31n7S9Md8aGwiKX",
            "identity": "pipeline-miner",
            "chain_id": "a642a8674f46696cc47fdb6b65f9c87b2a19c5ea8123b3d2f0c13b6f33a9d5ef",
            "block_reward": 80000000000
        }"#,
    )
    .unwrap()
}

#[test]
fn mined_record_survives_submission_format() {
    let mut record = PriceRecord::from_config(&config(), &feed).unwrap();
    record.set_height(206_422);
    record.set_version_entry_hash([0x01; 32]);
    record.set_winning_previous([0x02; 32]);

    assert_eq!(validate_address(&record.coinbase_address()), Ok(()));
    assert_eq!(record.asset(Asset::Usd), PRICE_SCALE / 2);

    let scorer = DifficultyScorer::default();
    let result = mine_batch(&scorer, &record, 0, 0, 500, None);
    assert_eq!(result.hashes_computed, 500);
    assert!(result.apply(&mut record));

    let entry = record.entry(record.chain_id);
    assert_eq!(entry.ext_ids, vec![record.nonce.to_vec()]);
    assert_eq!(entry.content.len(), RECORD_SIZE);

    // A peer reconstructs the record from the entry and agrees on the work
    let mut peer = PriceRecord::decode(&entry.content).unwrap();
    let mut nonce = [0u8; 32];
    nonce.copy_from_slice(&entry.ext_ids[0]);
    assert_eq!(scorer.score(nonce, &mut peer), record.difficulty);
    assert_eq!(peer.encode(), record.encode());
    assert!(entry.hash().is_ok());
}

#[test]
fn reward_address_may_be_generated() {
    let mut config = config();
    config.coinbase_address = random_address();

    let record = PriceRecord::from_config(&config, &feed).unwrap();
    assert_eq!(record.coinbase_address(), config.coinbase_address);
}
