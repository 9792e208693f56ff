//! text-huffman: Huffman entropy coding for text.
//!
//! The pipeline:
//! - frequency analysis of the input symbols
//! - greedy min-heap construction of a prefix-code tree
//! - code table derivation, encoding to a bit sequence
//! - decoding a bit sequence by walking the same tree
//!
//! Nothing is kept between calls. [`Compressor::compress`] hands back the tree
//! along with the payload, and the caller passes both to
//! [`Compressor::decompress`].

pub mod archive;
pub mod bits;
pub mod codec;
pub mod config;
pub mod entropy;
pub mod error;
pub mod frequency;
pub mod huffman;

pub use crate::bits::{BitString, EncodedPayload};
pub use crate::codec::CodeTable;
pub use crate::config::{CompressionConfig, Traversal};
pub use crate::error::CompressError;
pub use crate::frequency::FrequencyMap;
pub use crate::huffman::{HuffNode, HuffmanTree};

/// Result of compressing one text
#[derive(Debug, Clone)]
pub struct CompressedOutput {
    pub payload: EncodedPayload,
    pub tree: HuffmanTree,
    pub code_table: CodeTable,
    pub original_symbols: usize,
    pub metadata: CompressionMetadata,
}

impl CompressedOutput {
    /// Percentage saved against 8 bits per symbol.
    pub fn savings_percent(&self) -> f64 {
        entropy::savings_percent(self.payload.len(), self.original_symbols)
    }
}

/// Statistics gathered while compressing
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompressionMetadata {
    pub entropy_bits: f64,
    pub average_code_length: f64,
    pub payload_bits: usize,
    pub ratio: f64,
}

/// The main compressor engine
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    /// Create a new compressor with the given configuration
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn compress(&self, text: &str) -> Result<CompressedOutput, CompressError> {
        if text.is_empty() {
            return Err(CompressError::EmptyInput);
        }

        let freq = FrequencyMap::analyze(text);
        let symbols = freq.total() as usize;
        if symbols > self.config.max_input_symbols {
            return Err(CompressError::InputTooLarge {
                limit: self.config.max_input_symbols,
                actual: symbols,
            });
        }

        let tree = HuffmanTree::build(&freq)?;
        let code_table = codec::derive_codes(&tree, self.config.traversal);
        let payload = codec::encode(text, &code_table)?;

        if self.config.verify_roundtrip {
            let restored = codec::decode(&payload, &tree)?;
            if restored != text {
                tracing::warn!(symbols, "roundtrip verification failed");
                return Err(CompressError::MalformedPayload {
                    consumed: payload.len(),
                });
            }
        }

        let metadata = CompressionMetadata {
            entropy_bits: entropy::shannon_entropy(&freq),
            average_code_length: entropy::average_code_length(&freq, &code_table),
            payload_bits: payload.len(),
            ratio: entropy::ratio(payload.len(), symbols),
        };
        tracing::debug!(
            symbols,
            distinct = freq.len(),
            payload_bits = payload.len(),
            ratio = metadata.ratio,
            "compressed text"
        );

        Ok(CompressedOutput {
            payload,
            tree,
            code_table,
            original_symbols: symbols,
            metadata,
        })
    }

    /// Decode `payload` with the tree from the matching compress call.
    pub fn decompress(
        &self,
        payload: &EncodedPayload,
        tree: &HuffmanTree,
    ) -> Result<String, CompressError> {
        let text = codec::decode(payload, tree)?;
        tracing::debug!(
            payload_bits = payload.len(),
            symbols = text.chars().count(),
            "decompressed payload"
        );
        Ok(text)
    }
}

/// Compress with the default configuration.
pub fn compress(text: &str) -> Result<CompressedOutput, CompressError> {
    Compressor::default().compress(text)
}

/// Decompress with the default configuration.
pub fn decompress(payload: &EncodedPayload, tree: &HuffmanTree) -> Result<String, CompressError> {
    Compressor::default().decompress(payload, tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_empty() {
        let result = Compressor::default().compress("");
        assert!(matches!(result, Err(CompressError::EmptyInput)));
    }

    #[test]
    fn test_roundtrip() {
        let compressor = Compressor::default();
        let text = "the quick brown fox jumps over the lazy dog";
        let out = compressor.compress(text).unwrap();
        let restored = compressor.decompress(&out.payload, &out.tree).unwrap();
        assert_eq!(restored, text);
    }

    #[test]
    fn test_weight_matches_symbol_count() {
        let text = "naïve café";
        let out = compress(text).unwrap();
        assert_eq!(out.tree.weight(), text.chars().count() as u64);
        assert_eq!(out.original_symbols, text.chars().count());
    }

    #[test]
    fn test_input_limit() {
        let compressor = Compressor::new(CompressionConfig {
            max_input_symbols: 4,
            ..CompressionConfig::default()
        });
        let result = compressor.compress("hello");
        assert!(matches!(
            result,
            Err(CompressError::InputTooLarge { limit: 4, actual: 5 })
        ));
        assert!(compressor.compress("hell").is_ok());
    }

    #[test]
    fn test_verify_roundtrip_passes() {
        let compressor = Compressor::new(CompressionConfig {
            verify_roundtrip: true,
            traversal: Traversal::Iterative,
            ..CompressionConfig::default()
        });
        assert!(compressor.compress("abracadabra").is_ok());
    }

    #[test]
    fn test_metadata() {
        let out = compress("aaaa").unwrap();
        assert_eq!(out.metadata.payload_bits, 4);
        assert!(out.metadata.entropy_bits.abs() < 1e-9);
        assert!((out.metadata.average_code_length - 1.0).abs() < 1e-9);
        assert!((out.savings_percent() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn test_compression_ratio() {
        let text = "aaaaaaaaab".repeat(100);
        let out = compress(&text).unwrap();
        assert!(out.metadata.ratio < 1.0, "skewed text should compress");
    }
}
