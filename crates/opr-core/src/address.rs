//! Checksummed public address codec.
//!
//! A raw address is 38 bytes: a 2-byte type prefix, a 32-byte payload and a 4-byte
//! checksum (the first four bytes of SHA256d over prefix and payload). The text form
//! is the Base58 encoding of the raw bytes, 52 characters long.

use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::hash::double_sha256;
use crate::kind::{
    AddressKind, ADDRESS_PAYLOAD_SIZE, ADDRESS_TEXT_LEN, CHECKSUM_SIZE, RAW_ADDRESS_SIZE,
};

/// Address validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Character outside the Base58 alphabet.
    #[error("invalid base58 character: {0:?}")]
    Decode(char),

    /// Decoded byte count is not a raw address. For text longer than an address can
    /// be, `actual` is the fewest bytes the text could decode to.
    #[error("invalid address length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    /// Address belongs to a different type.
    #[error("address prefix mismatch: expected {}, got {}", hex::encode(.expected), hex::encode(.actual))]
    Prefix { expected: [u8; 2], actual: [u8; 2] },

    /// Trailing checksum does not match.
    #[error("invalid checksum")]
    Checksum,
}

/// Validates and generates addresses of a single kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressCodec {
    kind: AddressKind,
}

impl AddressCodec {
    /// Codec accepting only addresses of `kind`.
    pub fn new(kind: AddressKind) -> Self {
        AddressCodec { kind }
    }

    /// Codec for factoid public addresses, the kind used as reward address.
    pub fn factoid() -> Self {
        Self::new(AddressKind::FactoidPublic)
    }

    /// The kind this codec accepts.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Validate an address of this codec's kind.
    pub fn validate(&self, text: &str) -> Result<(), AddressError> {
        self.decode(text).map(|_| ())
    }

    /// Decode and validate an address, returning its raw bytes.
    ///
    /// Checks run in order: alphabet, length, prefix, checksum.
    pub fn decode(&self, text: &str) -> Result<[u8; RAW_ADDRESS_SIZE], AddressError> {
        let digits = base58_digits(text)?;

        // Anything longer decodes to more than a raw address
        if digits.len() > ADDRESS_TEXT_LEN {
            return Err(AddressError::Length {
                expected: RAW_ADDRESS_SIZE,
                actual: min_decoded_len(&digits),
            });
        }

        let decoded = base58_from_digits(&digits);

        if decoded.len() != RAW_ADDRESS_SIZE {
            return Err(AddressError::Length {
                expected: RAW_ADDRESS_SIZE,
                actual: decoded.len(),
            });
        }

        let mut raw = [0u8; RAW_ADDRESS_SIZE];
        raw.copy_from_slice(&decoded);

        let actual = [raw[0], raw[1]];
        let expected = self.kind.prefix();
        if actual != expected {
            return Err(AddressError::Prefix { expected, actual });
        }

        let body = RAW_ADDRESS_SIZE - CHECKSUM_SIZE;
        if raw[body..] != checksum(&raw[..body]) {
            return Err(AddressError::Checksum);
        }

        Ok(raw)
    }

    /// Encode a payload as an address of this codec's kind.
    pub fn encode(&self, payload: &[u8; ADDRESS_PAYLOAD_SIZE]) -> String {
        let mut raw = [0u8; RAW_ADDRESS_SIZE];
        raw[..2].copy_from_slice(&self.kind.prefix());
        raw[2..2 + ADDRESS_PAYLOAD_SIZE].copy_from_slice(payload);

        let body = RAW_ADDRESS_SIZE - CHECKSUM_SIZE;
        let sum = checksum(&raw[..body]);
        raw[body..].copy_from_slice(&sum);

        base58_encode(&raw)
    }

    /// Generate an address from 32 random payload bytes.
    pub fn generate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> String {
        let mut payload = [0u8; ADDRESS_PAYLOAD_SIZE];
        rng.fill_bytes(&mut payload);
        self.encode(&payload)
    }
}

/// Validate a factoid public address.
pub fn validate_address(text: &str) -> Result<(), AddressError> {
    AddressCodec::factoid().validate(text)
}

/// Generate a factoid public address from the thread-local CSPRNG.
pub fn random_address() -> String {
    AddressCodec::factoid().generate(&mut rand::thread_rng())
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = double_sha256(body);
    let mut sum = [0u8; CHECKSUM_SIZE];
    sum.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    sum
}

// ============================================================================
// Base58 Implementation
// ============================================================================

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Map every character to its digit value, failing on the first one outside the
/// alphabet.
fn base58_digits(input: &str) -> Result<Vec<u8>, AddressError> {
    input
        .chars()
        .map(|c| {
            BASE58_ALPHABET
                .iter()
                .position(|&x| c.is_ascii() && x == c as u8)
                .map(|value| value as u8)
                .ok_or(AddressError::Decode(c))
        })
        .collect()
}

fn base58_from_digits(digits: &[u8]) -> Vec<u8> {
    // Leading '1's become leading zero bytes
    let leading_zeros = digits.iter().take_while(|&&d| d == 0).count();

    // Bytes, least significant first
    let mut bytes: Vec<u8> = Vec::with_capacity(digits.len() * 733 / 1000 + 1);
    for &digit in &digits[leading_zeros..] {
        // Multiply by 58 and add the digit
        let mut carry = digit as u32;
        for byte in bytes.iter_mut() {
            let temp = (*byte as u32) * 58 + carry;
            *byte = (temp & 0xFF) as u8;
            carry = temp >> 8;
        }

        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut result = vec![0u8; leading_zeros];
    result.extend(bytes.iter().rev());
    result
}

/// Lower bound on the decoded size of `digits` without running the conversion.
///
/// Each leading '1' is one zero byte. The remaining `k` digits start with a nonzero
/// digit, so their value is at least 58^(k-1) and needs more than
/// `(k-1) * log2(58)` bits; 5.857 is just under log2(58).
fn min_decoded_len(digits: &[u8]) -> usize {
    let leading_zeros = digits.iter().take_while(|&&d| d == 0).count();
    let significant = digits.len() - leading_zeros;
    if significant == 0 {
        return leading_zeros;
    }
    leading_zeros + (significant - 1).saturating_mul(5857) / 8000 + 1
}

#[cfg(test)]
fn base58_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    base58_digits(input).map(|digits| base58_from_digits(&digits))
}

fn base58_encode(input: &[u8]) -> String {
    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

    // Base58 digits, least significant first
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[leading_zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let temp = ((*digit as u32) << 8) + carry;
            *digit = (temp % 58) as u8;
            carry = temp / 58;
        }

        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut encoded = String::with_capacity(leading_zeros + digits.len());
    encoded.extend(core::iter::repeat('1').take(leading_zeros));
    encoded.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    encoded
}
