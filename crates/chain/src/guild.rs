//! Genesis bootstrap: builds the first block, seeds a chain with it and
//! exposes the raw chain identifier.

use crate::blockchain::{BlockChain, ChainConfig, Result};
use cornerchain_core::{Address, Block, BlockHeader, Keypair};
use std::sync::atomic::AtomicBool;

/// A guild owns an identity and the chain it bootstrapped.
///
/// Bootstrap mines a genesis block (sentinel previous hash, all-zero
/// starting nonce) at the configured difficulty and registers it as the
/// chain head, so the chain is valid from its first block onwards.
pub struct Guild {
    keypair: Keypair,
    chain: BlockChain,
}

impl Guild {
    /// Bootstrap a fresh guild: new keypair, new chain, mined genesis.
    pub fn bootstrap(config: ChainConfig) -> Result<Self> {
        Self::with_keypair(Keypair::generate(), config)
    }

    /// Bootstrap with an existing identity.
    pub fn with_keypair(keypair: Keypair, config: ChainConfig) -> Result<Self> {
        let mut chain = BlockChain::with_config(config);

        let mut genesis = Block::genesis()?;
        genesis.difficulty = chain.config().difficulty;
        genesis.mine(None, &AtomicBool::new(false));
        chain.append_head(genesis)?;

        Ok(Self { keypair, chain })
    }

    /// The guild's address.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// The guild's keypair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// The bootstrapped chain.
    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    /// Mutable access to the chain (single-writer: the guild owns it).
    pub fn chain_mut(&mut self) -> &mut BlockChain {
        &mut self.chain
    }

    /// Raw chain identifier: the guild's address bytes followed by the
    /// genesis header bytes.
    pub fn raw(&self) -> Vec<u8> {
        let genesis = self
            .chain
            .genesis_block()
            .expect("bootstrapped chain always has a genesis block");
        let mut out =
            Vec::with_capacity(self.address().as_bytes().len() + BlockHeader::ENCODED_LENGTH);
        out.extend_from_slice(self.address().as_bytes());
        out.extend_from_slice(&genesis.header_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cornerchain_core::ADDRESS_LENGTH;

    fn easy_config() -> ChainConfig {
        ChainConfig {
            difficulty: 1,
            ..ChainConfig::default()
        }
    }

    #[test]
    fn test_bootstrap_seeds_valid_genesis() {
        let guild = Guild::bootstrap(easy_config()).unwrap();
        let chain = guild.chain();

        assert_eq!(chain.height(), 1);
        let genesis = chain.genesis_block().unwrap();
        assert_eq!(genesis.previous_hash, Block::genesis_previous_hash());
        assert!(genesis.hash().meets_difficulty(1));
    }

    #[test]
    fn test_raw_layout() {
        let guild = Guild::bootstrap(easy_config()).unwrap();
        let raw = guild.raw();

        assert_eq!(raw.len(), ADDRESS_LENGTH + BlockHeader::ENCODED_LENGTH);
        assert_eq!(&raw[..ADDRESS_LENGTH], guild.address().as_bytes());
        assert_eq!(
            &raw[ADDRESS_LENGTH..],
            guild.chain().genesis_block().unwrap().header_bytes()
        );
    }

    #[test]
    fn test_with_keypair_keeps_identity() {
        let kp = Keypair::generate();
        let address = kp.address();
        let guild = Guild::with_keypair(kp, easy_config()).unwrap();
        assert_eq!(guild.address(), address);
    }
}
