//! Ledger entry construction for mined records.
//!
//! A record is submitted as an entry whose only external ID is the nonce and whose
//! content is the canonical encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::{sha256, sha512};
use crate::record::{PriceRecord, HASH_SIZE};

/// Entry format version.
pub const ENTRY_VERSION: u8 = 0;

/// Entry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("external IDs take {0} bytes, at most 65535 allowed")]
    ExtIdsTooLarge(usize),
}

/// A ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Chain the entry is written to.
    pub chain_id: [u8; HASH_SIZE],
    /// External IDs.
    pub ext_ids: Vec<Vec<u8>>,
    /// Entry body.
    pub content: Vec<u8>,
}

impl Entry {
    /// Create an empty entry on a chain.
    pub fn new(chain_id: [u8; HASH_SIZE]) -> Self {
        Entry {
            chain_id,
            ext_ids: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Append an external ID.
    pub fn with_ext_id(mut self, ext_id: impl Into<Vec<u8>>) -> Self {
        self.ext_ids.push(ext_id.into());
        self
    }

    /// Set the entry body.
    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    /// Serialize the entry.
    ///
    /// Format: version (1) || chain id (32) || ext id section size (u16 BE) ||
    /// per ext id: length (u16 BE) || bytes || content
    pub fn marshal(&self) -> Result<Vec<u8>, EntryError> {
        let ext_size: usize = self.ext_ids.iter().map(|id| 2 + id.len()).sum();
        let ext_size_u16 = u16::try_from(ext_size).map_err(|_| EntryError::ExtIdsTooLarge(ext_size))?;

        let mut data = Vec::with_capacity(1 + HASH_SIZE + 2 + ext_size + self.content.len());
        data.push(ENTRY_VERSION);
        data.extend_from_slice(&self.chain_id);
        data.extend_from_slice(&ext_size_u16.to_be_bytes());
        for id in &self.ext_ids {
            // Each length fits: the section total already did
            data.extend_from_slice(&(id.len() as u16).to_be_bytes());
            data.extend_from_slice(id);
        }
        data.extend_from_slice(&self.content);

        Ok(data)
    }

    /// Entry hash: SHA256(SHA512(data) || data) over the marshalled entry.
    pub fn hash(&self) -> Result<[u8; 32], EntryError> {
        let data = self.marshal()?;
        let mut salted = Vec::with_capacity(64 + data.len());
        salted.extend_from_slice(&sha512(&data));
        salted.extend_from_slice(&data);
        Ok(sha256(&salted))
    }
}

/// Hands finished entries to the ledger.
pub trait EntrySubmitter {
    type Error: std::error::Error;

    /// Submit an entry, returning its entry hash on acceptance.
    fn submit(&self, entry: &Entry) -> Result<[u8; 32], Self::Error>;
}

impl PriceRecord {
    /// Build the entry recording this record on `chain_id`.
    pub fn entry(&self, chain_id: [u8; HASH_SIZE]) -> Entry {
        Entry::new(chain_id)
            .with_ext_id(self.nonce.to_vec())
            .with_content(self.encode().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::RECORD_SIZE;
    use std::cell::RefCell;

    #[test]
    fn test_marshal_layout() {
        let entry = Entry::new([0xAA; 32])
            .with_ext_id(b"ab".to_vec())
            .with_ext_id(Vec::new())
            .with_content(b"xyz".to_vec());
        let data = entry.marshal().unwrap();

        assert_eq!(data[0], ENTRY_VERSION);
        assert_eq!(&data[1..33], &[0xAA; 32]);
        // Section: (2 + 2) + (2 + 0)
        assert_eq!(&data[33..35], &[0, 6]);
        assert_eq!(&data[35..39], &[0, 2, b'a', b'b']);
        assert_eq!(&data[39..41], &[0, 0]);
        assert_eq!(&data[41..], b"xyz");
    }

    #[test]
    fn test_hash_composition() {
        let entry = Entry::new([1; 32]).with_content(b"hello".to_vec());
        let data = entry.marshal().unwrap();

        let mut salted = sha512(&data).to_vec();
        salted.extend_from_slice(&data);
        assert_eq!(entry.hash().unwrap(), sha256(&salted));
    }

    #[test]
    fn test_ext_ids_too_large() {
        let entry = Entry::new([0; 32]).with_ext_id(vec![0u8; 70_000]);
        assert_eq!(entry.marshal(), Err(EntryError::ExtIdsTooLarge(70_002)));
        assert!(entry.hash().is_err());
    }

    #[test]
    fn test_record_entry() {
        let mut record = PriceRecord::new();
        record.set_height(10);
        record.nonce = [0x42; 32];

        let entry = record.entry([0x77; 32]);
        assert_eq!(entry.chain_id, [0x77; 32]);
        assert_eq!(entry.ext_ids, vec![vec![0x42; 32]]);
        assert_eq!(entry.content.len(), RECORD_SIZE);
        assert_eq!(PriceRecord::decode(&entry.content).unwrap().height, 10);
    }

    #[test]
    fn test_entry_json() {
        let entry = Entry::new([3; 32]).with_ext_id(vec![1, 2]).with_content(vec![9]);
        let json = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        seen: RefCell<Vec<Entry>>,
    }

    impl EntrySubmitter for RecordingSubmitter {
        type Error = EntryError;

        fn submit(&self, entry: &Entry) -> Result<[u8; 32], EntryError> {
            self.seen.borrow_mut().push(entry.clone());
            entry.hash()
        }
    }

    #[test]
    fn test_submitter() {
        let submitter = RecordingSubmitter::default();
        let entry = PriceRecord::new().entry([5; 32]);

        let hash = submitter.submit(&entry).unwrap();
        assert_eq!(hash, entry.hash().unwrap());
        assert_eq!(submitter.seen.borrow().len(), 1);
    }
}
