//! Chain layer for cornerchain.
//!
//! This crate brings the core primitives together into a local chain view:
//! - **BlockChain**: append-only block store plus the unconfirmed-record pool
//! - **Miner**: proof-of-work search on a dedicated worker thread
//! - **Guild**: genesis bootstrap and chain identification
//! - **Wallet**: keypair bookkeeping
//!
//! # Example
//!
//! ```rust,no_run
//! use cornerchain_chain::{ChainConfig, Guild, Miner};
//!
//! // Bootstrap a chain with a mined genesis block.
//! let mut guild = Guild::bootstrap(ChainConfig::default()).unwrap();
//!
//! // Mine the next block on a worker thread.
//! let template = guild.chain().get_block_template().unwrap();
//! let miner = Miner::spawn(template, None);
//! let (block, _outcome) = miner.join().unwrap();
//!
//! // First submitted block for the current head wins.
//! guild.chain_mut().append_head(block).unwrap();
//! ```

pub mod blockchain;
pub mod guild;
pub mod miner;
pub mod wallet;

// Re-export commonly used types
pub use blockchain::{BlockChain, ChainConfig, ChainError, Result};
pub use guild::Guild;
pub use miner::Miner;
pub use wallet::Wallet;
