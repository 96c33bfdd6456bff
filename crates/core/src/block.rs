//! Blocks: header layout, merkle commitment and the proof-of-work search.

use crate::hash::{slow_hash, Hash, POW_ROUNDS};
use crate::merkle::MerkleTree;
use crate::record::{CodecError, Record};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Nonce width in bytes.
pub const NONCE_SIZE: usize = 4;

/// Default proof-of-work difficulty in leading zero bits.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Maximum records per block: the header count field is 3 bytes.
pub const MAX_RECORD_COUNT: u32 = 0xFF_FFFF;

/// Block header fields, serialized in this exact order, big-endian:
/// `version(2) || timestamp(8) || record_count(3) || merkle_root(32) ||
/// previous_hash(32) || nonce(4)`. This byte sequence is what gets
/// proof-of-work hashed; any change to field widths or order breaks every
/// existing block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u16,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// Number of records committed, at most [`MAX_RECORD_COUNT`].
    pub record_count: u32,
    pub merkle_root: Hash,
    pub previous_hash: Hash,
    pub nonce: [u8; NONCE_SIZE],
}

impl BlockHeader {
    /// Encoded header length in bytes.
    pub const ENCODED_LENGTH: usize = 2 + 8 + 3 + 32 + 32 + NONCE_SIZE;

    /// Serialize to the canonical byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LENGTH);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        // Record count as a 3-byte big-endian integer; Block keeps the
        // count within range, so the top byte is always zero.
        out.extend_from_slice(&self.record_count.to_be_bytes()[1..]);
        out.extend_from_slice(self.merkle_root.as_bytes());
        out.extend_from_slice(self.previous_hash.as_bytes());
        out.extend_from_slice(&self.nonce);
        out
    }

    /// Proof-of-work hash of the encoded header.
    pub fn hash(&self) -> Hash {
        slow_hash(&self.encode(), POW_ROUNDS)
    }
}

/// Outcome of a mining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MineOutcome {
    /// The block hash meets the difficulty target.
    Mined,
    /// The cancel flag was raised before a satisfying nonce was found.
    Cancelled,
}

/// A block: header fields, a coinbase record at index 0 and the remaining
/// records, with a merkle tree committing the whole ordered list.
///
/// A block starts as a mutable draft; only [`Block::mine`] touches the
/// nonce and timestamp, and a block is final once its hash satisfies the
/// difficulty target.
#[derive(Debug, Clone)]
pub struct Block {
    pub version: u16,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    pub previous_hash: Hash,
    pub nonce: [u8; NONCE_SIZE],
    /// Difficulty this block is expected to meet.
    pub difficulty: u32,
    coinbase: Record,
    records: Vec<Record>,
    tree: MerkleTree,
}

impl Block {
    /// The previous-hash sentinel for a first block: the slow hash of the
    /// empty byte string.
    pub fn genesis_previous_hash() -> Hash {
        slow_hash(&[], POW_ROUNDS)
    }

    /// Create a draft block referencing `previous_hash`, holding only the
    /// empty coinbase placeholder.
    pub fn new(previous_hash: Hash) -> Result<Self, CodecError> {
        let coinbase = Record::default();
        let tree = MerkleTree::build(&[coinbase.id()?]);
        Ok(Self {
            version: 0,
            timestamp: 0,
            previous_hash,
            nonce: [0u8; NONCE_SIZE],
            difficulty: DEFAULT_DIFFICULTY,
            coinbase,
            records: Vec::new(),
            tree,
        })
    }

    /// Create a draft genesis block: sentinel previous hash, all-zero
    /// nonce.
    pub fn genesis() -> Result<Self, CodecError> {
        Self::new(Self::genesis_previous_hash())
    }

    /// The full ordered record list: coinbase first, then the rest.
    pub fn corners(&self) -> impl Iterator<Item = &Record> {
        std::iter::once(&self.coinbase).chain(self.records.iter())
    }

    /// Number of records committed, coinbase included.
    pub fn record_count(&self) -> u32 {
        (1 + self.records.len()) as u32
    }

    /// Append a record and extend the merkle tree with its leaf.
    ///
    /// Errors with [`CodecError::EncodingOverflow`] once the header's
    /// 3-byte record count would overflow.
    pub fn push_record(&mut self, record: Record) -> Result<(), CodecError> {
        if self.record_count() >= MAX_RECORD_COUNT {
            return Err(CodecError::EncodingOverflow {
                what: "block record count",
                max: MAX_RECORD_COUNT as usize,
                got: MAX_RECORD_COUNT as usize + 1,
            });
        }
        let leaf = record.id()?;
        self.records.push(record);
        self.tree.extend(&[leaf]);
        Ok(())
    }

    /// Rebuild the merkle tree from the current record list.
    ///
    /// [`push_record`](Block::push_record) keeps the tree current
    /// incrementally; a full rebuild is only needed after records are
    /// mutated in place.
    pub fn compute_tree(&mut self) -> Result<(), CodecError> {
        let mut leaves = Vec::with_capacity(self.record_count() as usize);
        for record in self.corners() {
            leaves.push(record.id()?);
        }
        self.tree = MerkleTree::build(&leaves);
        Ok(())
    }

    /// Root of the current merkle tree.
    pub fn merkle_root(&self) -> Hash {
        self.tree.root()
    }

    /// Assemble the current header. Reflects the tree as last computed.
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            version: self.version,
            timestamp: self.timestamp,
            record_count: self.record_count(),
            merkle_root: self.tree.root(),
            previous_hash: self.previous_hash,
            nonce: self.nonce,
        }
    }

    /// Canonical header bytes, the proof-of-work pre-image.
    pub fn header_bytes(&self) -> Vec<u8> {
        self.header().encode()
    }

    /// The block hash: slow hash of the header bytes.
    pub fn hash(&self) -> Hash {
        self.header().hash()
    }

    /// Refresh the timestamp to now and draw 4 random nonce bytes.
    /// Touches nothing but those two header fields.
    pub fn randomize_nonce(&mut self) {
        self.timestamp = now_nanos();
        OsRng.fill_bytes(&mut self.nonce);
    }

    /// Search for a nonce whose header hash meets the difficulty target:
    /// the hash read as a big-endian integer below `2^(256 - difficulty)`.
    ///
    /// The search is unbounded; `cancel` is polled once per attempt, the
    /// only exit short of success. Defaults to the block's own difficulty.
    pub fn mine(&mut self, difficulty: Option<u32>, cancel: &AtomicBool) -> MineOutcome {
        let difficulty = difficulty.unwrap_or(self.difficulty);
        loop {
            if cancel.load(Ordering::Relaxed) {
                info!(difficulty, "mining cancelled");
                return MineOutcome::Cancelled;
            }
            let hash = self.hash();
            if hash.meets_difficulty(difficulty) {
                info!(%hash, difficulty, "mined");
                return MineOutcome::Mined;
            }
            debug!(%hash, "target missed");
            self.randomize_nonce();
        }
    }
}

/// Current time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos() as u64
}
