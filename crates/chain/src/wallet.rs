//! Wallet: keypair and record bookkeeping only, no validation.

use cornerchain_core::{Address, Keypair, Record};
use tracing::debug;

/// A list of owned keypairs and remembered records.
#[derive(Default)]
pub struct Wallet {
    keypairs: Vec<Keypair>,
    records: Vec<Record>,
}

impl Wallet {
    /// Create an empty wallet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh keypair and return its address.
    pub fn new_address(&mut self) -> Address {
        let keypair = Keypair::generate();
        let address = keypair.address();
        debug!(address = %address.to_base58(), "new address");
        self.keypairs.push(keypair);
        address
    }

    /// All addresses held, in generation order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.keypairs.iter().map(Keypair::address)
    }

    /// The keypair behind the n-th generated address.
    pub fn keypair(&self, index: usize) -> Option<&Keypair> {
        self.keypairs.get(index)
    }

    /// Number of keypairs held.
    pub fn len(&self) -> usize {
        self.keypairs.len()
    }

    /// Whether the wallet holds no keypairs.
    pub fn is_empty(&self) -> bool {
        self.keypairs.is_empty()
    }

    /// Remember a record of interest.
    pub fn remember_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Remembered records, in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
