//! Miner configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::address::{AddressCodec, AddressError};
use crate::asset::FeedError;
use crate::record::{RecordError, DIGITAL_ID_SIZE, HASH_SIZE};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid coinbase address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid chain id hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("chain id must be {expected} bytes, got {actual}")]
    ChainIdLength { expected: usize, actual: usize },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("price feed failed: {0}")]
    Feed(#[from] FeedError),
}

/// Settings a miner needs to build its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Factoid address receiving the block reward.
    pub coinbase_address: String,
    /// The miner's digital ID.
    pub identity: String,
    /// Oracle chain id, hex encoded.
    pub chain_id: String,
    /// Block reward, fixed point.
    #[serde(default)]
    pub block_reward: u64,
}

impl MinerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MinerConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(identity = %config.identity, "loaded miner config");
        Ok(config)
    }

    /// Check every field fits the record it will populate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        AddressCodec::factoid().validate(&self.coinbase_address)?;

        if self.identity.len() > DIGITAL_ID_SIZE {
            return Err(RecordError::FieldOverflow {
                field: "digital ID",
                max: DIGITAL_ID_SIZE,
                actual: self.identity.len(),
            }
            .into());
        }

        self.chain_id_bytes()?;
        Ok(())
    }

    /// Decode the chain id.
    pub fn chain_id_bytes(&self) -> Result<[u8; HASH_SIZE], ConfigError> {
        let bytes = hex::decode(&self.chain_id)?;
        let actual = bytes.len();
        bytes.try_into().map_err(|_| ConfigError::ChainIdLength {
            expected: HASH_SIZE,
            actual,
        })
    }
}
