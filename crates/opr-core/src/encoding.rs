//! Canonical binary encoding of a price record.
//!
//! The layout is positional: fields in declaration order, fixed widths, big-endian
//! integers, no tags and no length prefixes.
//!
//! | field              | bytes |
//! |--------------------|-------|
//! | chain id           | 32    |
//! | block height (i32) | 4     |
//! | version entry hash | 32    |
//! | winning previous   | 32    |
//! | coinbase address   | 57    |
//! | block reward (u64) | 8     |
//! | digital id         | 32    |
//! | 20 assets (u64)    | 160   |
//!
//! The nonce, difficulty and grade are never encoded.

use crate::asset::{Asset, ASSET_COUNT};
use crate::record::{PriceRecord, RecordError, ADDRESS_FIELD_SIZE, DIGITAL_ID_SIZE, HASH_SIZE};

/// Size of an encoded record.
pub const RECORD_SIZE: usize =
    HASH_SIZE + 4 + HASH_SIZE + HASH_SIZE + ADDRESS_FIELD_SIZE + 8 + DIGITAL_ID_SIZE + 8 * ASSET_COUNT;

impl PriceRecord {
    /// Serialize the canonical fields to 357 bytes.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        let mut writer = Writer { buf: &mut out, pos: 0 };

        writer.put(&self.chain_id);
        writer.put(&self.height.to_be_bytes());
        writer.put(&self.version_entry_hash);
        writer.put(&self.winning_previous);
        writer.put(&self.coinbase_address);
        writer.put(&self.block_reward.to_be_bytes());
        writer.put(&self.digital_id);
        for value in self.assets.values() {
            writer.put(&value.to_be_bytes());
        }

        debug_assert_eq!(writer.pos, RECORD_SIZE);
        out
    }

    /// Deserialize a record. The nonce, difficulty and grade are zero.
    pub fn decode(data: &[u8]) -> Result<Self, RecordError> {
        let mut record = PriceRecord::new();
        record.decode_into(data)?;
        Ok(record)
    }

    /// Overwrite the canonical fields from `data`, keeping nonce, difficulty and grade.
    ///
    /// On error the record is left unchanged.
    pub fn decode_into(&mut self, data: &[u8]) -> Result<(), RecordError> {
        let mut reader = Reader { data };

        let chain_id = reader.take::<HASH_SIZE>("chain id")?;
        let height = i32::from_be_bytes(reader.take("block height")?);
        let version_entry_hash = reader.take::<HASH_SIZE>("version entry hash")?;
        let winning_previous = reader.take::<HASH_SIZE>("winning previous")?;
        let coinbase_address = reader.take::<ADDRESS_FIELD_SIZE>("coinbase address")?;
        let block_reward = u64::from_be_bytes(reader.take("block reward")?);
        let digital_id = reader.take::<DIGITAL_ID_SIZE>("digital id")?;

        let mut assets = self.assets;
        for asset in Asset::ALL {
            assets.set(asset, u64::from_be_bytes(reader.take(asset.symbol())?));
        }

        if !reader.data.is_empty() {
            return Err(RecordError::TrailingData { extra: reader.data.len() });
        }

        self.chain_id = chain_id;
        self.height = height;
        self.version_entry_hash = version_entry_hash;
        self.winning_previous = winning_previous;
        self.coinbase_address = coinbase_address;
        self.block_reward = block_reward;
        self.digital_id = digital_id;
        self.assets = assets;
        Ok(())
    }
}

struct Writer<'a> {
    buf: &'a mut [u8; RECORD_SIZE],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

/// Bounds-checked field reader.
struct Reader<'a> {
    data: &'a [u8],
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], RecordError> {
        if self.data.len() < N {
            return Err(RecordError::Truncated {
                field,
                needed: N,
                available: self.data.len(),
            });
        }

        let (head, rest) = self.data.split_at(N);
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        self.data = rest;
        Ok(out)
    }
}
