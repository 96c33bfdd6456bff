//! Tagged, length-prefixed records — the payloads committed into blocks.
//!
//! Wire form: `payload_len as u16 be || kind_flag as i8 || payload`.
//! Flag `-1` is the empty/unspecified record (the default-constructed
//! coinbase placeholder); flag `0` is a transaction. The tag leaves room
//! for new record kinds without breaking the wire form of existing ones.

use crate::crypto::CryptoError;
use crate::hash::{fast_hash, Hash};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while encoding or decoding wire formats.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A count or length that no longer fits its fixed-width field.
    #[error("{what} exceeds fixed-width capacity (max {max}, got {got})")]
    EncodingOverflow {
        what: &'static str,
        max: usize,
        got: usize,
    },

    #[error("input truncated while decoding {what}")]
    Truncated { what: &'static str },

    #[error("unknown record kind flag {0}")]
    UnknownRecordKind(i8),

    #[error("trailing bytes after {what}")]
    TrailingBytes { what: &'static str },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// A tagged record. Today the only concrete variant is a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Record {
    /// Empty/unspecified record, flag `-1`. Used as the coinbase
    /// placeholder until coinbase semantics exist.
    #[default]
    Empty,
    /// A transaction, flag `0`.
    Transaction(Transaction),
}

impl Record {
    pub const EMPTY_FLAG: i8 = -1;
    pub const TRANSACTION_FLAG: i8 = 0;

    /// The kind flag carried on the wire.
    pub fn flag(&self) -> i8 {
        match self {
            Record::Empty => Self::EMPTY_FLAG,
            Record::Transaction(_) => Self::TRANSACTION_FLAG,
        }
    }

    /// The variant payload, without the tag/length framing.
    pub fn payload(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Record::Empty => Ok(Vec::new()),
            Record::Transaction(tx) => tx.payload(),
        }
    }

    /// Encode to the wire form.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let payload = self.payload()?;
        if payload.len() > u16::MAX as usize {
            return Err(CodecError::EncodingOverflow {
                what: "record payload length",
                max: u16::MAX as usize,
                got: payload.len(),
            });
        }

        let mut out = Vec::with_capacity(3 + payload.len());
        out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        out.push(self.flag() as u8);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Decode a record from its wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < 3 {
            return Err(CodecError::Truncated {
                what: "record framing",
            });
        }
        let payload_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        let flag = bytes[2] as i8;
        let payload = &bytes[3..];
        if payload.len() < payload_len {
            return Err(CodecError::Truncated {
                what: "record payload",
            });
        }
        if payload.len() > payload_len {
            return Err(CodecError::TrailingBytes { what: "record" });
        }

        match flag {
            Self::EMPTY_FLAG => {
                if payload_len != 0 {
                    return Err(CodecError::TrailingBytes {
                        what: "empty record",
                    });
                }
                Ok(Record::Empty)
            }
            Self::TRANSACTION_FLAG => Ok(Record::Transaction(Transaction::decode(payload)?)),
            other => Err(CodecError::UnknownRecordKind(other)),
        }
    }

    /// Content id of this record: the fast hash of its wire form. Keys the
    /// unconfirmed pool and serves as the Merkle leaf pre-image.
    pub fn id(&self) -> Result<Hash, CodecError> {
        Ok(fast_hash(&self.encode()?))
    }
}
