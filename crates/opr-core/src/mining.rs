//! Nonce search over a record.
//!
//! Each worker owns a record clone and a disjoint slice of the nonce space, selected by
//! its worker id. Batches are independent, so any number of workers can search in
//! parallel; the best result across workers wins.

use tracing::debug;

use crate::difficulty::DifficultyScorer;
use crate::hash::{PowHash, ScoreExtractor};
use crate::record::{PriceRecord, NONCE_SIZE};

/// Build a nonce from a worker id (bytes 0..4) and a counter (bytes 24..32), both big-endian.
pub fn nonce_for(worker: u32, counter: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[..4].copy_from_slice(&worker.to_be_bytes());
    nonce[NONCE_SIZE - 8..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// Result of a mining batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningResult {
    /// Best nonce in the batch, if any nonce was tried.
    pub nonce: Option<[u8; NONCE_SIZE]>,
    /// Difficulty of `nonce`.
    pub difficulty: u64,
    /// Number of nonces scored.
    pub hashes_computed: u64,
    /// Whether `nonce` meets the batch target.
    pub target_met: bool,
}

impl MiningResult {
    /// Create a result for an empty batch.
    pub fn not_found(hashes: u64) -> Self {
        MiningResult {
            nonce: None,
            difficulty: 0,
            hashes_computed: hashes,
            target_met: false,
        }
    }

    /// Create a result carrying the best nonce of a batch that missed its target.
    pub fn best(nonce: [u8; NONCE_SIZE], difficulty: u64, hashes: u64) -> Self {
        MiningResult {
            nonce: Some(nonce),
            difficulty,
            hashes_computed: hashes,
            target_met: false,
        }
    }

    /// Create a result for a nonce meeting the target.
    pub fn target(nonce: [u8; NONCE_SIZE], difficulty: u64, hashes: u64) -> Self {
        MiningResult {
            nonce: Some(nonce),
            difficulty,
            hashes_computed: hashes,
            target_met: true,
        }
    }

    /// Whether this result beats the nonce already cached on `record`.
    pub fn improves(&self, record: &PriceRecord) -> bool {
        self.nonce.is_some() && self.difficulty > record.difficulty
    }

    /// Cache the found nonce and its difficulty on the record.
    ///
    /// Returns false, leaving the record alone, when the batch found nothing.
    pub fn apply(&self, record: &mut PriceRecord) -> bool {
        match self.nonce {
            Some(nonce) => {
                record.nonce = nonce;
                record.difficulty = self.difficulty;
                true
            }
            None => false,
        }
    }
}

/// Mine a range of counters for one worker.
///
/// # Arguments
/// * `scorer` - The difficulty scorer
/// * `record` - The record being mined (its digest is computed once)
/// * `worker` - Worker id embedded in every nonce
/// * `counter_start` - First counter value
/// * `count` - Number of counters to try
/// * `target` - Stop early once a nonce reaches this difficulty
pub fn mine_batch<H: PowHash, E: ScoreExtractor>(
    scorer: &DifficultyScorer<H, E>,
    record: &PriceRecord,
    worker: u32,
    counter_start: u64,
    count: u64,
    target: Option<u64>,
) -> MiningResult {
    let digest = scorer.record_digest(record);
    let counter_end = counter_start.saturating_add(count);
    let mut best: Option<([u8; NONCE_SIZE], u64)> = None;

    for counter in counter_start..counter_end {
        let nonce = nonce_for(worker, counter);
        let difficulty = scorer.difficulty_with_digest(&nonce, &digest);
        let hashes = counter - counter_start + 1;

        if target.is_some_and(|t| difficulty >= t) {
            debug!(worker, counter, difficulty, "nonce met target");
            return MiningResult::target(nonce, difficulty, hashes);
        }

        match &best {
            Some((_, best_difficulty)) if difficulty <= *best_difficulty => {}
            _ => best = Some((nonce, difficulty)),
        }
    }

    let hashes = counter_end - counter_start;
    match best {
        Some((nonce, difficulty)) => {
            debug!(worker, difficulty, hashes, "batch finished");
            MiningResult::best(nonce, difficulty, hashes)
        }
        None => MiningResult::not_found(hashes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::hash::LeadingZeroBitsScore;

    fn record() -> PriceRecord {
        let mut record = PriceRecord::new();
        record.set_height(1);
        record.set_asset(Asset::Pnt, 42);
        record
    }

    #[test]
    fn test_nonce_layout() {
        let nonce = nonce_for(0x0102_0304, 0x1122_3344_5566_7788);
        assert_eq!(&nonce[..4], &[1, 2, 3, 4]);
        assert!(nonce[4..24].iter().all(|&b| b == 0));
        assert_eq!(&nonce[24..], &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);
        assert_ne!(nonce_for(1, 0), nonce_for(2, 0));
    }

    #[test]
    fn test_batch_returns_best_nonce() {
        let scorer = DifficultyScorer::default();
        let record = record();

        let result = mine_batch(&scorer, &record, 0, 0, 64, None);
        assert_eq!(result.hashes_computed, 64);
        assert!(!result.target_met);

        let best = (0..64)
            .map(|c| scorer.difficulty(&nonce_for(0, c), &record))
            .max()
            .unwrap();
        assert_eq!(result.difficulty, best);
        assert_eq!(scorer.difficulty(&result.nonce.unwrap(), &record), best);
    }

    #[test]
    fn test_batch_stops_at_target() {
        let scorer = DifficultyScorer::default();
        let record = record();

        // Every nonce meets a zero target, so the first one wins
        let result = mine_batch(&scorer, &record, 3, 10, 1_000, Some(0));
        assert!(result.target_met);
        assert_eq!(result.hashes_computed, 1);
        assert_eq!(result.nonce, Some(nonce_for(3, 10)));
    }

    #[test]
    fn test_empty_batch() {
        let scorer = DifficultyScorer::default();
        let result = mine_batch(&scorer, &record(), 0, 5, 0, None);
        assert_eq!(result, MiningResult::not_found(0));

        let mut record = record();
        assert!(!result.apply(&mut record));
        assert_eq!(record.difficulty, 0);
    }

    #[test]
    fn test_apply_caches_on_record() {
        let scorer = DifficultyScorer::new(crate::hash::Sha256PowHash, LeadingZeroBitsScore);
        let mut record = record();
        let result = mine_batch(&scorer, &record, 0, 0, 256, None);

        assert!(result.improves(&record));
        assert!(result.apply(&mut record));
        assert_eq!(record.nonce, result.nonce.unwrap());
        assert_eq!(scorer.compute_difficulty(&mut record), result.difficulty);
        assert!(!result.improves(&record));
    }

    #[test]
    fn test_parallel_workers_on_clones() {
        let scorer = DifficultyScorer::default();
        let record = record();

        let results: Vec<MiningResult> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4u32)
                .map(|worker| {
                    let local = record.clone();
                    let scorer = &scorer;
                    s.spawn(move || mine_batch(scorer, &local, worker, 0, 128, None))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winner = results.iter().max_by_key(|r| r.difficulty).unwrap();
        let nonce = winner.nonce.unwrap();
        assert_eq!(scorer.difficulty(&nonce, &record), winner.difficulty);

        // Same batch again gives the same answer
        let worker = u32::from_be_bytes([nonce[0], nonce[1], nonce[2], nonce[3]]);
        assert_eq!(&mine_batch(&scorer, &record, worker, 0, 128, None), winner);
    }
}
