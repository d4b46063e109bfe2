//! Digest helpers and the pluggable proof-of-work primitives.

use sha2::{Digest, Sha256, Sha512};

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Double SHA256: SHA256(SHA256(data)).
///
/// The address checksum is the first four bytes of this digest.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Single SHA512 hash.
#[inline]
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let hash = Sha512::digest(data);
    let mut result = [0u8; 64];
    result.copy_from_slice(&hash);
    result
}

/// The hash primitive used for proof of work.
///
/// Must be deterministic and total. Closures `Fn(&[u8]) -> [u8; 32]` implement it,
/// which is how tests swap in doubles.
pub trait PowHash {
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

impl<F> PowHash for F
where
    F: Fn(&[u8]) -> [u8; 32],
{
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        self(data)
    }
}

/// Maps a proof-of-work digest to a comparable scalar. Higher means more work.
pub trait ScoreExtractor {
    fn extract(&self, digest: &[u8; 32]) -> u64;
}

impl<F> ScoreExtractor for F
where
    F: Fn(&[u8; 32]) -> u64,
{
    fn extract(&self, digest: &[u8; 32]) -> u64 {
        self(digest)
    }
}

/// Plain SHA256 standing in for the network's memory-hard hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256PowHash;

impl PowHash for Sha256PowHash {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        sha256(data)
    }
}

/// Reads the first 8 digest bytes as a big-endian integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingU64Score;

impl ScoreExtractor for LeadingU64Score {
    fn extract(&self, digest: &[u8; 32]) -> u64 {
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(head)
    }
}

/// Scores a digest by its number of leading zero bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingZeroBitsScore;

impl ScoreExtractor for LeadingZeroBitsScore {
    fn extract(&self, digest: &[u8; 32]) -> u64 {
        count_leading_zeros(digest) as u64
    }
}

/// Count leading zero bits, most significant byte first.
pub fn count_leading_zeros(hash: &[u8; 32]) -> u32 {
    let mut zeros = 0u32;
    for byte in hash.iter() {
        if *byte == 0 {
            zeros += 8;
        } else {
            zeros += byte.leading_zeros();
            break;
        }
    }
    zeros
}
