//! Background mining worker.
//!
//! The proof-of-work search is a tight CPU loop with no suspension points,
//! so it runs on a dedicated thread and the chain stays responsive.
//! Cancellation is cooperative: the loop polls a shared flag once per
//! nonce attempt. Miners never touch the chain; the caller submits the
//! mined block through `BlockChain::append_head`, which serializes head
//! updates.

use crate::blockchain::{ChainError, Result};
use cornerchain_core::{Block, MineOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A mining run on a dedicated worker thread.
pub struct Miner {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<(Block, MineOutcome)>,
}

impl Miner {
    /// Start mining `block` on a new thread. `difficulty` defaults to the
    /// block's own.
    pub fn spawn(mut block: Block, difficulty: Option<u32>) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let outcome = block.mine(difficulty, &flag);
            (block, outcome)
        });
        Self { cancel, handle }
    }

    /// Request cancellation. Observed at the next nonce attempt.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and take back the block with its outcome.
    ///
    /// On cancellation the block comes back as the search left it; a
    /// cancelled run is an outcome, not an error.
    pub fn join(self) -> Result<(Block, MineOutcome)> {
        self.handle.join().map_err(|_| ChainError::WorkerFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miner_finds_block() {
        let block = Block::genesis().unwrap();
        let miner = Miner::spawn(block, Some(1));
        let (mined, outcome) = miner.join().unwrap();

        assert_eq!(outcome, MineOutcome::Mined);
        assert!(mined.hash().meets_difficulty(1));
    }

    #[test]
    fn test_miner_cancellation() {
        let block = Block::genesis().unwrap();
        // A target no search will hit in test time.
        let miner = Miner::spawn(block, Some(240));
        miner.cancel();
        let (_, outcome) = miner.join().unwrap();

        assert_eq!(outcome, MineOutcome::Cancelled);
    }
}
