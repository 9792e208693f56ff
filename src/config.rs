//! Configuration for text-huffman

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CompressError;

/// How the code table is derived from a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// Call-stack recursion; depth equals tree height.
    #[default]
    Recursive,
    /// Explicit stack, for very deep (skewed) trees.
    Iterative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub max_input_symbols: usize,
    pub traversal: Traversal,
    pub verify_roundtrip: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_input_symbols: 100 * 1024 * 1024, // 100 Mi symbols
            traversal: Traversal::Recursive,
            verify_roundtrip: false,
        }
    }
}

impl CompressionConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CompressError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CompressError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
