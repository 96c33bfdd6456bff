//! The chain store: ordered blocks, the unconfirmed-record pool and the
//! validation hooks.

use cornerchain_core::{Block, CodecError, Hash, Record, Transaction, DEFAULT_DIFFICULTY};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("block references unknown parent {0}")]
    UnknownParent(Hash),

    #[error("block parent {parent} is not the current head {head}")]
    StaleParent { parent: Hash, head: Hash },

    #[error("block hash misses its difficulty target of {0} bits")]
    DifficultyNotMet(u32),

    #[error("first block must reference the empty-chain sentinel")]
    BadGenesis,

    #[error("record {0} already in the unconfirmed pool")]
    DuplicateRecord(Hash),

    #[error("chain has no head yet")]
    MissingGenesis,

    #[error("mining worker terminated abnormally")]
    WorkerFailed,
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// Chain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Proof-of-work difficulty in leading zero bits.
    pub difficulty: u32,
    /// Maximum records attached to a block template, coinbase excluded.
    pub max_template_records: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_template_records: 1000,
        }
    }
}

/// An append-only chain of blocks plus the pool of unconfirmed records.
///
/// `block_hashes` holds chain order; every hash in it maps to an entry in
/// `blocks`. Head updates go exclusively through [`BlockChain::append_head`],
/// which keeps that invariant runtime-checked; with multiple mining
/// producers the first submitted block for a given head wins and later
/// competitors are rejected.
pub struct BlockChain {
    config: ChainConfig,
    block_hashes: Vec<Hash>,
    blocks: HashMap<Hash, Block>,
    unconfirmed: HashMap<Hash, Record>,
    /// Pool insertion order, so template snapshots are deterministic.
    pool_order: VecDeque<Hash>,
}

impl BlockChain {
    /// Create an empty chain with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Create an empty chain with the given configuration.
    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            config,
            block_hashes: Vec::new(),
            blocks: HashMap::new(),
            unconfirmed: HashMap::new(),
            pool_order: VecDeque::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of blocks in the chain.
    pub fn height(&self) -> usize {
        self.block_hashes.len()
    }

    /// Hash of the current head block, if any.
    pub fn head_hash(&self) -> Option<Hash> {
        self.block_hashes.last().copied()
    }

    /// Chain-ordered block hashes.
    pub fn block_hashes(&self) -> &[Hash] {
        &self.block_hashes
    }

    /// Look up a block by hash.
    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    /// The first block of the chain, if any.
    pub fn genesis_block(&self) -> Option<&Block> {
        self.block_hashes.first().and_then(|h| self.blocks.get(h))
    }

    /// Number of unconfirmed records in the pool.
    pub fn pool_len(&self) -> usize {
        self.unconfirmed.len()
    }

    /// Whether the unconfirmed pool is empty.
    pub fn pool_is_empty(&self) -> bool {
        self.unconfirmed.is_empty()
    }

    /// Submit a record to the unconfirmed pool. Returns its id.
    pub fn submit_record(&mut self, record: Record) -> Result<Hash> {
        let id = record.id()?;
        if self.unconfirmed.contains_key(&id) {
            return Err(ChainError::DuplicateRecord(id));
        }
        self.pool_order.push_back(id);
        self.unconfirmed.insert(id, record);
        Ok(id)
    }

    /// Validation hook for a single transaction.
    ///
    /// Extension point, intentionally structural for now: fee positivity,
    /// input existence and double-spend detection need the confirmed
    /// output set, which this core does not track.
    // TODO: check fee positivity, input existence and double-spends once
    // confirmed outputs are indexed.
    pub fn check_transaction(&self, tx: &Transaction) -> bool {
        tx.body().is_ok()
    }

    /// Validate a block against this chain without mutating anything.
    ///
    /// Both must hold: the parent hash is a known block, and the block's
    /// proof-of-work hash meets its stated difficulty.
    pub fn check_block(&self, block: &Block) -> bool {
        self.blocks.contains_key(&block.previous_hash)
            && block.hash().meets_difficulty(block.difficulty)
    }

    /// Append a validated block as the new head. Returns its hash.
    ///
    /// Validation happens here too, not just in [`check_block`]: an
    /// unvalidated append would corrupt the chain silently, so the checks
    /// are runtime-enforced. An empty chain accepts only a block carrying
    /// the genesis sentinel as parent; afterwards the parent must be the
    /// current head (first submitted wins for competing blocks).
    pub fn append_head(&mut self, block: Block) -> Result<Hash> {
        let hash = block.hash();

        match self.head_hash() {
            None => {
                if block.previous_hash != Block::genesis_previous_hash() {
                    return Err(ChainError::BadGenesis);
                }
            }
            Some(head) => {
                if !self.blocks.contains_key(&block.previous_hash) {
                    return Err(ChainError::UnknownParent(block.previous_hash));
                }
                if block.previous_hash != head {
                    return Err(ChainError::StaleParent {
                        parent: block.previous_hash,
                        head,
                    });
                }
            }
        }
        if !hash.meets_difficulty(block.difficulty) {
            return Err(ChainError::DifficultyNotMet(block.difficulty));
        }

        // Confirmed records leave the pool.
        for record in block.corners() {
            let id = record.id()?;
            if self.unconfirmed.remove(&id).is_some() {
                self.pool_order.retain(|h| h != &id);
            }
        }

        self.block_hashes.push(hash);
        self.blocks.insert(hash, block);
        info!(height = self.block_hashes.len(), %hash, "new head");
        Ok(hash)
    }

    /// Build a draft block on the current head: fresh timestamp, chain
    /// difficulty, empty coinbase placeholder and a snapshot of the
    /// unconfirmed pool in submission order.
    ///
    /// The caller mines the draft and submits it back through
    /// [`append_head`].
    pub fn get_block_template(&self) -> Result<Block> {
        let head = self.head_hash().ok_or(ChainError::MissingGenesis)?;

        let mut block = Block::new(head)?;
        block.difficulty = self.config.difficulty;
        block.timestamp = cornerchain_core::block::now_nanos();
        for id in self.pool_order.iter().take(self.config.max_template_records) {
            if let Some(record) = self.unconfirmed.get(id) {
                block.push_record(record.clone())?;
            }
        }
        Ok(block)
    }
}

impl Default for BlockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornerchain_core::{Keypair, MineOutcome, Transaction, TxOutput};
    use std::sync::atomic::AtomicBool;

    fn easy_config() -> ChainConfig {
        ChainConfig {
            difficulty: 1,
            ..ChainConfig::default()
        }
    }

    fn mined_genesis(difficulty: u32) -> Block {
        let mut genesis = Block::genesis().unwrap();
        genesis.difficulty = difficulty;
        assert_eq!(
            genesis.mine(None, &AtomicBool::new(false)),
            MineOutcome::Mined
        );
        genesis
    }

    fn sample_record() -> Record {
        let kp = Keypair::generate();
        let mut tx = Transaction::new(0);
        tx.outputs.push(TxOutput {
            address: kp.address(),
            amount: 10,
        });
        tx.sign(&kp).unwrap();
        Record::Transaction(tx)
    }

    #[test]
    fn test_append_genesis() {
        let mut chain = BlockChain::with_config(easy_config());
        let genesis = mined_genesis(1);
        let hash = chain.append_head(genesis).unwrap();

        assert_eq!(chain.height(), 1);
        assert_eq!(chain.head_hash(), Some(hash));
        assert!(chain.genesis_block().is_some());
    }

    #[test]
    fn test_append_rejects_wrong_genesis_parent() {
        let mut chain = BlockChain::with_config(easy_config());
        let mut block = Block::new(Hash::ZERO).unwrap();
        block.difficulty = 1;
        block.mine(None, &AtomicBool::new(false));
        assert!(matches!(
            chain.append_head(block),
            Err(ChainError::BadGenesis)
        ));
    }

    #[test]
    fn test_append_rejects_weak_hash() {
        let mut chain = BlockChain::with_config(easy_config());
        let mut genesis = Block::genesis().unwrap();
        // High enough that an unmined header will not meet it by chance.
        genesis.difficulty = 64;
        assert!(matches!(
            chain.append_head(genesis),
            Err(ChainError::DifficultyNotMet(64))
        ));
    }

    #[test]
    fn test_append_rejects_unknown_parent() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();

        let mut block = Block::new(cornerchain_core::fast_hash(b"nowhere")).unwrap();
        block.difficulty = 1;
        block.mine(None, &AtomicBool::new(false));
        assert!(matches!(
            chain.append_head(block),
            Err(ChainError::UnknownParent(_))
        ));
    }

    #[test]
    fn test_competing_block_for_same_parent_loses() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();

        let cancel = AtomicBool::new(false);
        let mut first = chain.get_block_template().unwrap();
        let mut second = chain.get_block_template().unwrap();
        first.mine(None, &cancel);
        second.mine(None, &cancel);

        chain.append_head(first).unwrap();
        assert!(matches!(
            chain.append_head(second),
            Err(ChainError::StaleParent { .. })
        ));
        assert_eq!(chain.height(), 2);
    }

    #[test]
    fn test_check_block_semantics() {
        let mut chain = BlockChain::with_config(easy_config());
        let genesis_hash = chain.append_head(mined_genesis(1)).unwrap();

        let cancel = AtomicBool::new(false);
        let mut good = chain.get_block_template().unwrap();
        good.mine(None, &cancel);
        assert_eq!(good.previous_hash, genesis_hash);
        assert!(chain.check_block(&good));

        // Unknown parent fails even with valid work.
        let mut orphan = Block::new(cornerchain_core::fast_hash(b"orphan")).unwrap();
        orphan.difficulty = 1;
        orphan.mine(None, &cancel);
        assert!(!chain.check_block(&orphan));

        // Valid parent fails without sufficient work.
        let mut weak = chain.get_block_template().unwrap();
        weak.difficulty = 64;
        assert!(!chain.check_block(&weak));
    }

    #[test]
    fn test_check_block_does_not_mutate() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();
        let height = chain.height();

        let template = chain.get_block_template().unwrap();
        let _ = chain.check_block(&template);
        assert_eq!(chain.height(), height);
    }

    #[test]
    fn test_submit_record_and_duplicate() {
        let mut chain = BlockChain::new();
        let record = sample_record();
        let id = chain.submit_record(record.clone()).unwrap();

        assert_eq!(chain.pool_len(), 1);
        assert!(matches!(
            chain.submit_record(record),
            Err(ChainError::DuplicateRecord(dup)) if dup == id
        ));
    }

    #[test]
    fn test_template_snapshots_pool_in_order() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();

        let r1 = sample_record();
        let r2 = sample_record();
        let id1 = chain.submit_record(r1.clone()).unwrap();
        let id2 = chain.submit_record(r2.clone()).unwrap();

        let template = chain.get_block_template().unwrap();
        let ids: Vec<_> = template
            .corners()
            .skip(1) // coinbase placeholder
            .map(|r| r.id().unwrap())
            .collect();
        assert_eq!(ids, vec![id1, id2]);
    }

    #[test]
    fn test_template_respects_record_limit() {
        let config = ChainConfig {
            difficulty: 1,
            max_template_records: 1,
        };
        let mut chain = BlockChain::with_config(config);
        chain.append_head(mined_genesis(1)).unwrap();

        chain.submit_record(sample_record()).unwrap();
        chain.submit_record(sample_record()).unwrap();

        let template = chain.get_block_template().unwrap();
        assert_eq!(template.record_count(), 2); // coinbase + 1
    }

    #[test]
    fn test_template_requires_head() {
        let chain = BlockChain::new();
        assert!(matches!(
            chain.get_block_template(),
            Err(ChainError::MissingGenesis)
        ));
    }

    #[test]
    fn test_append_drains_confirmed_records() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();

        chain.submit_record(sample_record()).unwrap();
        chain.submit_record(sample_record()).unwrap();
        assert_eq!(chain.pool_len(), 2);

        let mut block = chain.get_block_template().unwrap();
        block.mine(None, &AtomicBool::new(false));
        chain.append_head(block).unwrap();

        assert!(chain.pool_is_empty());
    }

    #[test]
    fn test_every_hash_has_a_block() {
        let mut chain = BlockChain::with_config(easy_config());
        chain.append_head(mined_genesis(1)).unwrap();
        for _ in 0..3 {
            let mut block = chain.get_block_template().unwrap();
            block.mine(None, &AtomicBool::new(false));
            chain.append_head(block).unwrap();
        }

        for hash in chain.block_hashes() {
            assert!(chain.get_block(hash).is_some());
        }
    }

    #[test]
    fn test_check_transaction_accepts_structural() {
        let chain = BlockChain::new();
        let tx = Transaction::new(0);
        assert!(chain.check_transaction(&tx));
    }
}
