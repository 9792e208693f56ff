//! Self-contained serialized form: the tree plus the bit-packed payload
//!
//! The core API never needs this; it exists for callers that have to store or
//! transmit a compression result. Layout is whatever `bincode` produces for
//! [`HuffArchive`]; the tree goes in as its flat pre-order node list.

use serde::{Deserialize, Serialize};

use crate::bits::{BitString, EncodedPayload};
use crate::error::CompressError;
use crate::huffman::HuffmanTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuffArchive {
    pub tree: HuffmanTree,
    pub bit_len: usize,
    pub data: Vec<u8>,
}

impl HuffArchive {
    pub fn new(tree: HuffmanTree, payload: &EncodedPayload) -> Result<Self, CompressError> {
        Ok(Self {
            tree,
            bit_len: payload.len(),
            data: payload.to_packed()?,
        })
    }

    pub fn payload(&self) -> Result<EncodedPayload, CompressError> {
        BitString::from_packed(&self.data, self.bit_len)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CompressError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize; the tree is rebuilt and validated while loading.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompressError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
