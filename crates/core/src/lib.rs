//! Core blockchain primitives for cornerchain.
//!
//! This crate provides the fundamental types of the system:
//! - Hashing (fast Blake3 content hash, slow Argon2id proof-of-work hash)
//! - Identities (keypairs, base-58 addresses, bound signatures)
//! - Records and transactions with their exact wire encodings
//! - Merkle trees
//! - Blocks, headers and the mining loop

pub mod block;
pub mod crypto;
pub mod hash;
pub mod merkle;
pub mod record;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockHeader, MineOutcome, DEFAULT_DIFFICULTY, NONCE_SIZE};
pub use crypto::{Address, CryptoError, Keypair, Signature, ADDRESS_LENGTH};
pub use hash::{fast_hash, hash_concat, slow_hash, Hash, H256, POW_ROUNDS};
pub use merkle::{merkle_root, MerkleTree};
pub use record::{CodecError, Record};
pub use transaction::{Transaction, TxInput, TxOutput};
