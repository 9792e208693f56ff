//! Error types for text-huffman

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("empty input")]
    EmptyInput,

    #[error("symbol {0:?} has no code in the code table")]
    UnknownSymbol(char),

    #[error("malformed payload: bit sequence ended mid-path after {consumed} bits")]
    MalformedPayload { consumed: usize },

    #[error("input too large: {actual} symbols exceeds limit of {limit}")]
    InputTooLarge { limit: usize, actual: usize },

    #[error("symbol weights overflow u64")]
    WeightOverflow,

    #[error("invalid bit character {0:?}, expected '0' or '1'")]
    InvalidBit(char),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for CompressError {
    fn from(e: bincode::Error) -> Self {
        CompressError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CompressError {
    fn from(e: serde_json::Error) -> Self {
        CompressError::Serialization(e.to_string())
    }
}
