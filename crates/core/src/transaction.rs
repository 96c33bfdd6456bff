//! Transaction bodies, signing and the record-0 wire encoding.

use crate::crypto::{Address, CryptoError, Keypair, Signature, ADDRESS_LENGTH};
use crate::hash::Hash;
use crate::record::CodecError;
use serde::{Deserialize, Serialize};

/// Upper bound on inputs or outputs per transaction: counts are one byte.
pub const MAX_LIST_LENGTH: usize = u8::MAX as usize;

const ORIGIN_LENGTH: usize = 32;
const INPUT_LENGTH: usize = ADDRESS_LENGTH + ORIGIN_LENGTH;
const OUTPUT_LENGTH: usize = ADDRESS_LENGTH + 8;

/// A transaction input: the spending address and a reference to the record
/// that produced the value being spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub address: Address,
    /// Id of the originating record.
    pub origin: Hash,
}

/// A transaction output: recipient address and amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub amount: u64,
}

/// A transaction, the concrete record variant with kind flag `0`.
///
/// A transaction with zero signatures is structurally valid but not yet
/// authorized; signature order must match the order signers applied them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub signatures: Vec<Signature>,
}

impl Transaction {
    /// Create an empty transaction of the given version.
    pub fn new(version: u8) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Encode the body: version, input count, inputs, output count,
    /// outputs. This is what signers sign; signatures are excluded.
    ///
    /// Counts are single bytes; more than [`MAX_LIST_LENGTH`] inputs or
    /// outputs is an [`CodecError::EncodingOverflow`], never a silent
    /// truncation.
    pub fn body(&self) -> Result<Vec<u8>, CodecError> {
        if self.inputs.len() > MAX_LIST_LENGTH {
            return Err(CodecError::EncodingOverflow {
                what: "transaction input count",
                max: MAX_LIST_LENGTH,
                got: self.inputs.len(),
            });
        }
        if self.outputs.len() > MAX_LIST_LENGTH {
            return Err(CodecError::EncodingOverflow {
                what: "transaction output count",
                max: MAX_LIST_LENGTH,
                got: self.outputs.len(),
            });
        }

        let mut out = Vec::with_capacity(
            3 + self.inputs.len() * INPUT_LENGTH + self.outputs.len() * OUTPUT_LENGTH,
        );
        out.push(self.version);
        out.push(self.inputs.len() as u8);
        for input in &self.inputs {
            out.extend_from_slice(input.address.as_bytes());
            out.extend_from_slice(input.origin.as_bytes());
        }
        out.push(self.outputs.len() as u8);
        for output in &self.outputs {
            out.extend_from_slice(output.address.as_bytes());
            out.extend_from_slice(&output.amount.to_be_bytes());
        }
        Ok(out)
    }

    /// Full record payload: body followed by each signature's raw bytes in
    /// signing order.
    pub fn payload(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = self.body()?;
        for signature in &self.signatures {
            out.extend_from_slice(&signature.raw());
        }
        Ok(out)
    }

    /// Sign the body with `keypair` and append the signature.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), CodecError> {
        let body = self.body()?;
        self.signatures.push(keypair.sign(&body));
        Ok(())
    }

    /// Verify every attached signature against the body.
    ///
    /// Returns `false` for an unsigned transaction (structurally valid but
    /// not authorized) and on any verification failure; never errors.
    pub fn verify_signatures(&self) -> bool {
        let Ok(body) = self.body() else {
            return false;
        };
        !self.signatures.is_empty() && self.signatures.iter().all(|sig| sig.verify(&body))
    }

    /// Decode a transaction from a record payload.
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = payload;

        let version = take(&mut cursor, 1, "transaction version")?[0];
        let input_count = take(&mut cursor, 1, "input count")?[0] as usize;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let bytes = take(&mut cursor, INPUT_LENGTH, "transaction input")?;
            let mut address = [0u8; ADDRESS_LENGTH];
            address.copy_from_slice(&bytes[..ADDRESS_LENGTH]);
            let mut origin = [0u8; ORIGIN_LENGTH];
            origin.copy_from_slice(&bytes[ADDRESS_LENGTH..]);
            inputs.push(TxInput {
                address: Address::from_bytes(address),
                origin: Hash::from_bytes(origin),
            });
        }

        let output_count = take(&mut cursor, 1, "output count")?[0] as usize;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let bytes = take(&mut cursor, OUTPUT_LENGTH, "transaction output")?;
            let mut address = [0u8; ADDRESS_LENGTH];
            address.copy_from_slice(&bytes[..ADDRESS_LENGTH]);
            let mut amount = [0u8; 8];
            amount.copy_from_slice(&bytes[ADDRESS_LENGTH..]);
            outputs.push(TxOutput {
                address: Address::from_bytes(address),
                amount: u64::from_be_bytes(amount),
            });
        }

        // Whatever remains is a sequence of raw signatures.
        if cursor.len() % Signature::RAW_LENGTH != 0 {
            return Err(CodecError::Crypto(CryptoError::MalformedSignature {
                expected: Signature::RAW_LENGTH,
                got: cursor.len() % Signature::RAW_LENGTH,
            }));
        }
        let mut signatures = Vec::with_capacity(cursor.len() / Signature::RAW_LENGTH);
        for raw in cursor.chunks(Signature::RAW_LENGTH) {
            signatures.push(Signature::decode(raw)?);
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            signatures,
        })
    }
}

fn take<'a>(cursor: &mut &'a [u8], n: usize, what: &'static str) -> Result<&'a [u8], CodecError> {
    if cursor.len() < n {
        return Err(CodecError::Truncated { what });
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}
