//! Hashing primitives: a fast content hash and a slow proof-of-work hash.
//!
//! Two distinct primitives are deliberate. Merkle leaves, record ids and
//! address checksums are hashed constantly and use Blake3 ([`fast_hash`]).
//! Block proof-of-work uses a memory-hard Argon2id digest ([`slow_hash`])
//! whose cost is tunable via a round count without changing output length.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named alias for a 32-byte(u8) array, used to represent a 256-bit hash.
pub type H256 = [u8; 32];

/// Round count used when hashing block headers for proof-of-work.
pub const POW_ROUNDS: u32 = 4;

/// Domain-separation salt for the proof-of-work hash.
const POW_SALT: &[u8] = b"cornerchain.pow.";

/// A wrapper type for H256 with Display and Debug formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub H256);

impl Hash {
    /// The zero hash (all zeros).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a new Hash from raw bytes.
    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether the top `bits` bits of this digest, read as a big-endian
    /// integer, are all zero. Equivalent to `int(hash) < 2^(256 - bits)`,
    /// which is the proof-of-work target test.
    pub fn meets_difficulty(&self, bits: u32) -> bool {
        let mut remaining = bits;
        for byte in self.0 {
            if remaining == 0 {
                return true;
            }
            let checked = remaining.min(8);
            if byte >> (8 - checked) != 0 {
                return false;
            }
            remaining -= checked;
        }
        remaining == 0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<H256> for Hash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for H256 {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash arbitrary data using Blake3.
pub fn fast_hash(data: &[u8]) -> Hash {
    Hash(blake3::hash(data).into())
}

/// Hash multiple pieces of data by concatenating them.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

/// Hash data with the memory-hard proof-of-work function.
///
/// `rounds` sets the Argon2 time cost (clamped to at least 1); it scales
/// how expensive the digest is to compute, not its length. Memory and
/// parallelism are pinned so the digest is stable across builds.
pub fn slow_hash(data: &[u8], rounds: u32) -> Hash {
    let params =
        Params::new(8, rounds.max(1), 1, Some(32)).expect("static argon2 params are valid");
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut out = [0u8; 32];
    argon
        .hash_password_into(data, POW_SALT, &mut out)
        .expect("output buffer matches configured length");
    Hash(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_hash_deterministic() {
        let data = b"hello world";
        let h1 = fast_hash(data);
        let h2 = fast_hash(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_fast_hash_different_inputs() {
        let h1 = fast_hash(b"hello");
        let h2 = fast_hash(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let h = fast_hash(b"test data");
        let hex_str = h.to_hex();
        let parsed = Hash::from_hex(&hex_str).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn test_hash_display() {
        let h = fast_hash(b"test");
        let display = format!("{}", h);
        assert!(display.starts_with("0x"));
        assert_eq!(display.len(), 66); // "0x" + 64 hex chars
    }

    #[test]
    fn test_hash_concat() {
        let h1 = hash_concat(&[b"hello", b"world"]);
        let h2 = fast_hash(b"helloworld");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_json_roundtrip() {
        let h = fast_hash(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        let parsed: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn test_slow_hash_deterministic() {
        let h1 = slow_hash(b"block header", 2);
        let h2 = slow_hash(b"block header", 2);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_slow_hash_rounds_change_digest() {
        let h1 = slow_hash(b"block header", 1);
        let h2 = slow_hash(b"block header", 2);
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_slow_hash_differs_from_fast_hash() {
        assert_ne!(slow_hash(b"data", POW_ROUNDS), fast_hash(b"data"));
    }

    #[test]
    fn test_meets_difficulty_zero_bits() {
        assert!(fast_hash(b"anything").meets_difficulty(0));
    }

    #[test]
    fn test_meets_difficulty_leading_bits() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x0f; // top 4 bits zero
        let h = Hash::from_bytes(bytes);
        assert!(h.meets_difficulty(4));
        assert!(!h.meets_difficulty(5));
    }

    #[test]
    fn test_meets_difficulty_byte_boundary() {
        let mut bytes = [0u8; 32];
        bytes[1] = 0x80; // top 8 bits zero, 9th bit set
        let h = Hash::from_bytes(bytes);
        assert!(h.meets_difficulty(8));
        assert!(!h.meets_difficulty(9));
    }

    #[test]
    fn test_meets_difficulty_all_zero() {
        assert!(Hash::ZERO.meets_difficulty(256));
    }
}
