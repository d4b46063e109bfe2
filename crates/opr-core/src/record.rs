//! The oracle price record and its mutators.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::asset::{format_fixed_point, Asset, AssetPrices, PriceFeed, ASSET_COUNT};
use crate::config::{ConfigError, MinerConfig};

/// Width of every hash and identifier field.
pub const HASH_SIZE: usize = 32;

/// Width of the NUL-padded reward address field.
pub const ADDRESS_FIELD_SIZE: usize = 57;

/// Width of the digital ID field.
pub const DIGITAL_ID_SIZE: usize = 32;

/// Width of a mining nonce.
pub const NONCE_SIZE: usize = 32;

/// Errors produced while building or decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Input ended before a field was complete.
    #[error("record truncated at {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Input continues past the last field.
    #[error("record has {extra} trailing bytes")]
    TrailingData { extra: usize },

    /// Value does not fit its fixed-width field.
    #[error("{field} is {actual} bytes but the field holds {max}")]
    FieldOverflow {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// An oracle price record.
///
/// Only the canonical fields take part in encoding and hashing. The nonce, the cached
/// difficulty and the grade ride along for the miner's convenience.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// Identifies the chain the record is written to.
    pub chain_id: [u8; HASH_SIZE],
    /// Block height the record contributes to.
    pub height: i32,
    /// Pins the protocol version in effect.
    pub version_entry_hash: [u8; HASH_SIZE],
    /// Links to the previous round's winning record.
    pub winning_previous: [u8; HASH_SIZE],
    /// Reward address text, NUL padded.
    pub coinbase_address: [u8; ADDRESS_FIELD_SIZE],
    /// Block reward, fixed point.
    pub block_reward: u64,
    /// The miner's digital ID, NUL padded.
    pub digital_id: [u8; DIGITAL_ID_SIZE],
    /// Asset prices, fixed point.
    pub assets: AssetPrices,

    // Not part of the canonical encoding.
    /// Nonce found by mining.
    pub nonce: [u8; NONCE_SIZE],
    /// Difficulty of `nonce`, cached by the scorer.
    pub difficulty: u64,
    /// Grade assigned when records are compared.
    pub grade: f64,
}

impl Default for PriceRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceRecord {
    /// Create an empty record: every field zeroed.
    pub fn new() -> Self {
        PriceRecord {
            chain_id: [0u8; HASH_SIZE],
            height: 0,
            version_entry_hash: [0u8; HASH_SIZE],
            winning_previous: [0u8; HASH_SIZE],
            coinbase_address: [0u8; ADDRESS_FIELD_SIZE],
            block_reward: 0,
            digital_id: [0u8; DIGITAL_ID_SIZE],
            assets: AssetPrices::default(),
            nonce: [0u8; NONCE_SIZE],
            difficulty: 0,
            grade: 0.0,
        }
    }

    /// Build a record for a miner: reward address, digital ID, chain and reward from the
    /// configuration, asset values from the feed.
    pub fn from_config<F: PriceFeed + ?Sized>(
        config: &MinerConfig,
        feed: &F,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut record = PriceRecord::new();
        record.set_chain_id(config.chain_id_bytes()?);
        record.set_coinbase_address(&config.coinbase_address)?;
        record.set_digital_id(config.identity.as_bytes())?;
        record.set_block_reward(config.block_reward);
        record.set_asset_values(&AssetPrices::pull(feed)?);

        debug!(identity = %config.identity, "built price record from config");
        Ok(record)
    }

    pub fn set_chain_id(&mut self, chain_id: [u8; HASH_SIZE]) {
        self.chain_id = chain_id;
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    pub fn set_version_entry_hash(&mut self, hash: [u8; HASH_SIZE]) {
        self.version_entry_hash = hash;
    }

    pub fn set_winning_previous(&mut self, hash: [u8; HASH_SIZE]) {
        self.winning_previous = hash;
    }

    /// Store the reward address text verbatim, zero filling the rest of the field.
    ///
    /// The text is not validated here; run it through
    /// [`AddressCodec::validate`](crate::address::AddressCodec::validate) first if it
    /// comes from an untrusted source.
    pub fn set_coinbase_address(&mut self, address: &str) -> Result<(), RecordError> {
        let bytes = address.as_bytes();
        if bytes.len() > ADDRESS_FIELD_SIZE {
            return Err(RecordError::FieldOverflow {
                field: "coinbase address",
                max: ADDRESS_FIELD_SIZE,
                actual: bytes.len(),
            });
        }

        self.coinbase_address = [0u8; ADDRESS_FIELD_SIZE];
        self.coinbase_address[..bytes.len()].copy_from_slice(bytes);
        debug!(address, "set coinbase address");
        Ok(())
    }

    /// The reward address up to its first NUL byte.
    pub fn coinbase_address(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(until_nul(&self.coinbase_address))
    }

    pub fn set_block_reward(&mut self, reward: u64) {
        self.block_reward = reward;
    }

    /// Store a digital ID, zero filling the rest of the field.
    pub fn set_digital_id(&mut self, id: &[u8]) -> Result<(), RecordError> {
        if id.len() > DIGITAL_ID_SIZE {
            return Err(RecordError::FieldOverflow {
                field: "digital ID",
                max: DIGITAL_ID_SIZE,
                actual: id.len(),
            });
        }

        self.digital_id = [0u8; DIGITAL_ID_SIZE];
        self.digital_id[..id.len()].copy_from_slice(id);
        Ok(())
    }

    pub fn set_asset(&mut self, asset: Asset, value: u64) {
        self.assets.set(asset, value);
    }

    pub fn asset(&self, asset: Asset) -> u64 {
        self.assets.get(asset)
    }

    /// Replace every asset value.
    pub fn set_asset_values(&mut self, prices: &AssetPrices) {
        self.assets = *prices;
    }

    /// Asset values in canonical order.
    pub fn tokens(&self) -> [u64; ASSET_COUNT] {
        *self.assets.values()
    }

    /// One-line summary: digital ID, entry hash, nonce, difficulty and grade.
    pub fn short_string(&self, entry_hash: Option<&[u8; 32]>) -> String {
        let hash = match entry_hash {
            Some(hash) => hex::encode(hash),
            None => "00".to_string(),
        };
        format!(
            "DID {:>6} EntryHash {:>70} Nonce {:>33} Difficulty {:>15} Grade {:>20.6}",
            hex::encode(&self.digital_id[..6]),
            hash,
            hex::encode(&self.nonce[..16]),
            self.difficulty,
            self.grade,
        )
    }
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// Field/value table. Shows the cached difficulty; it does not rescore.
impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:14}Field{:14}Value", "", "")?;
        writeln!(f, "{:>32} {}", "ChainID", hex::encode(self.chain_id))?;
        writeln!(f, "{:>32} {}", "Difficulty", self.difficulty)?;
        writeln!(f, "{:>32} {}", "Block Height", self.height)?;
        writeln!(f, "{:>32} {}", "VersionEntryHash", hex::encode(self.version_entry_hash))?;
        writeln!(f, "{:>32} {}", "WinningPrevious", hex::encode(self.winning_previous))?;
        writeln!(f, "{:>32} {}", "Coinbase Address", self.coinbase_address())?;
        writeln!(f, "{:>32} {}", "BlockReward", format_fixed_point(self.block_reward))?;
        writeln!(f, "{:>32} {}", "DigitalID", hex::encode(self.digital_id))?;
        for (asset, value) in self.assets.iter() {
            writeln!(f, "{:>32} {}", asset.symbol(), format_fixed_point(value))?;
        }
        Ok(())
    }
}
