//! Ed25519 identities, base-58 addresses and bound signatures.

use crate::hash::fast_hash;
use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use ripemd::{Digest, Ripemd160};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Length of the RIPEMD-160 body of an address.
pub const ADDRESS_BODY_LENGTH: usize = 20;

/// Length of the address checksum appended to the body.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 8;

/// Total address length: body plus checksum.
pub const ADDRESS_LENGTH: usize = ADDRESS_BODY_LENGTH + ADDRESS_CHECKSUM_LENGTH;

/// Raw bytes of an address: RIPEMD-160 body followed by an 8-byte checksum.
pub type AddressBytes = [u8; ADDRESS_LENGTH];

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A raw signature shorter than the public-key segment, or whose
    /// remainder is not a whole signature.
    #[error("malformed signature: expected {expected} bytes, got {got}")]
    MalformedSignature { expected: usize, got: usize },

    #[error("invalid address format")]
    InvalidAddress,
}

/// An address derived from a public key.
///
/// The first 20 bytes are `RIPEMD160(fast_hash(pubkey))`; the last 8 are
/// the first 8 bytes of `fast_hash` of that 20-byte body. Deriving an
/// address is a pure function of the public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub AddressBytes);

impl Address {
    /// Derive the address for a public key.
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> Self {
        let key_hash = fast_hash(public_key);
        let body = Ripemd160::digest(key_hash.as_bytes());
        let checksum = fast_hash(&body);

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[..ADDRESS_BODY_LENGTH].copy_from_slice(&body);
        bytes[ADDRESS_BODY_LENGTH..].copy_from_slice(&checksum.as_bytes()[..ADDRESS_CHECKSUM_LENGTH]);
        Self(bytes)
    }

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: AddressBytes) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &AddressBytes {
        &self.0
    }

    /// Encode in base-58 (Bitcoin alphabet), the only textual form shown
    /// to users.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Parse a base-58 address, re-checking length and checksum.
    pub fn from_base58(s: &str) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| CryptoError::InvalidAddress)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(CryptoError::InvalidAddress);
        }

        let checksum = fast_hash(&bytes[..ADDRESS_BODY_LENGTH]);
        if bytes[ADDRESS_BODY_LENGTH..] != checksum.as_bytes()[..ADDRESS_CHECKSUM_LENGTH] {
            return Err(CryptoError::InvalidAddress);
        }

        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A detached signature bound to the public key that produced it.
///
/// The two are never separated once constructed: a signature without its
/// key cannot be verified, so the raw wire form carries both.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    public_key: [u8; PUBLIC_KEY_LENGTH],
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    /// Raw wire length: public key followed by signature bytes.
    pub const RAW_LENGTH: usize = PUBLIC_KEY_LENGTH + SIGNATURE_LENGTH;

    /// Bind signature bytes to the public key that produced them.
    pub fn new(public_key: [u8; PUBLIC_KEY_LENGTH], bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { public_key, bytes }
    }

    /// The bound public key bytes.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    /// The signature bytes themselves.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Raw encoding: `public_key || signature`.
    pub fn raw(&self) -> [u8; Self::RAW_LENGTH] {
        let mut out = [0u8; Self::RAW_LENGTH];
        out[..PUBLIC_KEY_LENGTH].copy_from_slice(&self.public_key);
        out[PUBLIC_KEY_LENGTH..].copy_from_slice(&self.bytes);
        out
    }

    /// Split a raw encoding back into its bound key and signature bytes.
    ///
    /// The first [`PUBLIC_KEY_LENGTH`] bytes are the key; the remainder
    /// must be exactly one signature.
    pub fn decode(raw: &[u8]) -> Result<Self, CryptoError> {
        if raw.len() != Self::RAW_LENGTH {
            return Err(CryptoError::MalformedSignature {
                expected: Self::RAW_LENGTH,
                got: raw.len(),
            });
        }
        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(&raw[..PUBLIC_KEY_LENGTH]);
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes.copy_from_slice(&raw[PUBLIC_KEY_LENGTH..]);
        Ok(Self { public_key, bytes })
    }

    /// Verify this signature over `message`.
    ///
    /// The message is pre-hashed with `fast_hash`, matching [`Keypair::sign`].
    /// Returns `false` on any cryptographic failure, including a bound key
    /// that does not parse; it never errors.
    pub fn verify(&self, message: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.public_key) else {
            return false;
        };
        let signature = DalekSignature::from_bytes(&self.bytes);
        let digest = fast_hash(message);
        verifying_key.verify(digest.as_bytes(), &signature).is_ok()
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(self.raw().as_slice(), serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        Signature::decode(&bytes).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &hex::encode(&self.bytes[..8]))
    }
}

/// A keypair for signing. The private scalar is exclusively owned and is
/// never serialized.
pub struct Keypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random keypair from the OS RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Restore a keypair from a private scalar.
    pub fn from_private_key(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Get the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Get the public key bytes.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Get the address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    /// Sign a message, producing a signature bound to this key.
    ///
    /// Signs `fast_hash(message)` rather than the raw message; verification
    /// applies the same pre-hash, so skipping it on either side fails.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let digest = fast_hash(message);
        let signature = self.signing_key.sign(digest.as_bytes());
        Signature::new(self.public_key(), signature.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish()
    }
}
