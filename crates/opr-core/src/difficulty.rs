//! Proof-of-work difficulty scoring.
//!
//! difficulty = extract(H(nonce || H(encode(record))))

use tracing::trace;

use crate::hash::{LeadingU64Score, PowHash, ScoreExtractor, Sha256PowHash};
use crate::record::{PriceRecord, NONCE_SIZE};

/// Scores nonces against a record with a pluggable hash and score extractor.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyScorer<H = Sha256PowHash, E = LeadingU64Score> {
    hasher: H,
    extractor: E,
}

impl Default for DifficultyScorer {
    fn default() -> Self {
        DifficultyScorer::new(Sha256PowHash, LeadingU64Score)
    }
}

impl<H: PowHash, E: ScoreExtractor> DifficultyScorer<H, E> {
    pub fn new(hasher: H, extractor: E) -> Self {
        DifficultyScorer { hasher, extractor }
    }

    /// Hash of the record's canonical encoding.
    pub fn record_digest(&self, record: &PriceRecord) -> [u8; 32] {
        self.hasher.hash(&record.encode())
    }

    /// Hash of `nonce || record_digest`.
    pub fn nonce_digest(&self, nonce: &[u8; NONCE_SIZE], record_digest: &[u8; 32]) -> [u8; 32] {
        let mut data = [0u8; NONCE_SIZE + 32];
        data[..NONCE_SIZE].copy_from_slice(nonce);
        data[NONCE_SIZE..].copy_from_slice(record_digest);
        self.hasher.hash(&data)
    }

    /// Difficulty of a nonce given a precomputed record digest.
    ///
    /// Mining loops compute the record digest once and call this per nonce.
    pub fn difficulty_with_digest(&self, nonce: &[u8; NONCE_SIZE], record_digest: &[u8; 32]) -> u64 {
        self.extractor.extract(&self.nonce_digest(nonce, record_digest))
    }

    /// Difficulty of a nonce against a record, without touching the record.
    pub fn difficulty(&self, nonce: &[u8; NONCE_SIZE], record: &PriceRecord) -> u64 {
        self.difficulty_with_digest(nonce, &self.record_digest(record))
    }

    /// Score `nonce` and cache it, with its difficulty, on the record.
    pub fn score(&self, nonce: [u8; NONCE_SIZE], record: &mut PriceRecord) -> u64 {
        record.nonce = nonce;
        self.compute_difficulty(record)
    }

    /// Score the record's own nonce and cache the difficulty.
    pub fn compute_difficulty(&self, record: &mut PriceRecord) -> u64 {
        let difficulty = self.difficulty(&record.nonce, record);
        trace!(nonce = %hex::encode(record.nonce), difficulty, "scored nonce");
        record.difficulty = difficulty;
        difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::hash::sha256;

    fn record() -> PriceRecord {
        let mut record = PriceRecord::new();
        record.set_height(206_422);
        record.set_asset(Asset::Usd, 100_000_000);
        record
    }

    #[test]
    fn test_record_digest_hashes_encoding() {
        let scorer = DifficultyScorer::default();
        let record = record();
        assert_eq!(scorer.record_digest(&record), sha256(&record.encode()));
    }

    #[test]
    fn test_two_hash_applications() {
        // Count hash calls and capture their input lengths
        let calls = std::cell::RefCell::new(Vec::new());
        let hasher = |data: &[u8]| {
            calls.borrow_mut().push(data.len());
            sha256(data)
        };
        let scorer = DifficultyScorer::new(hasher, LeadingU64Score);

        scorer.difficulty(&[1; 32], &record());
        assert_eq!(*calls.borrow(), vec![357, 64]);
    }

    #[test]
    fn test_score_matches_manual_composition() {
        let scorer = DifficultyScorer::default();
        let record = record();
        let nonce = [9u8; 32];

        let mut data = nonce.to_vec();
        data.extend_from_slice(&sha256(&record.encode()));
        let digest = sha256(&data);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);

        assert_eq!(scorer.difficulty(&nonce, &record), u64::from_be_bytes(head));
    }

    #[test]
    fn test_score_caches_on_record() {
        let scorer = DifficultyScorer::default();
        let mut record = record();
        let expected = scorer.difficulty(&[5; 32], &record);

        assert_eq!(scorer.score([5; 32], &mut record), expected);
        assert_eq!(record.nonce, [5; 32]);
        assert_eq!(record.difficulty, expected);

        // The cache does not feed back into the encoding
        assert_eq!(scorer.compute_difficulty(&mut record), expected);
    }

    #[test]
    fn test_deterministic() {
        let scorer = DifficultyScorer::default();
        let record = record();
        assert_eq!(scorer.difficulty(&[3; 32], &record), scorer.difficulty(&[3; 32], &record.clone()));
    }

    #[test]
    fn test_distinct_nonces_score_differently() {
        let scorer = DifficultyScorer::default();
        let record = record();
        let digest = scorer.record_digest(&record);

        let mut scores: Vec<u64> = (0u8..=255)
            .map(|i| scorer.difficulty_with_digest(&[i; 32], &digest))
            .collect();
        scores.sort_unstable();
        scores.dedup();
        assert_eq!(scores.len(), 256);
    }

    #[test]
    fn test_extractor_is_pluggable() {
        let constant = |_: &[u8; 32]| 77u64;
        let scorer = DifficultyScorer::new(Sha256PowHash, constant);
        assert_eq!(scorer.difficulty(&[0; 32], &record()), 77);
    }

    #[test]
    fn test_record_change_changes_score() {
        let scorer = DifficultyScorer::default();
        let mut record = record();
        let before = scorer.difficulty(&[1; 32], &record);
        record.set_asset(Asset::Xau, 1);
        assert_ne!(scorer.difficulty(&[1; 32], &record), before);
    }
}
