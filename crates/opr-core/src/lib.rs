//! Oracle price records for a proof-of-work price oracle.
//!
//! This crate provides:
//! - Checksummed Base58 reward addresses (validation and generation)
//! - The canonical 357-byte record encoding
//! - Proof-of-work difficulty scoring over a pluggable hash
//! - Batch nonce search and ledger entry construction

pub mod address;
pub mod asset;
pub mod config;
pub mod difficulty;
pub mod encoding;
pub mod entry;
pub mod hash;
pub mod kind;
pub mod mining;
pub mod record;

pub use address::{random_address, validate_address, AddressCodec, AddressError};
pub use asset::{Asset, AssetPrices, FeedError, PriceFeed};
pub use config::{ConfigError, MinerConfig};
pub use difficulty::DifficultyScorer;
pub use encoding::RECORD_SIZE;
pub use entry::{Entry, EntryError, EntrySubmitter};
pub use hash::{LeadingU64Score, PowHash, ScoreExtractor, Sha256PowHash};
pub use kind::AddressKind;
pub use mining::{mine_batch, nonce_for, MiningResult};
pub use record::{PriceRecord, RecordError};
