//! Code derivation, encoding and decoding over a Huffman tree

use std::collections::BTreeMap;
use std::fmt;

use crate::bits::{BitString, EncodedPayload};
use crate::config::Traversal;
use crate::error::CompressError;
use crate::huffman::{HuffNode, HuffmanTree};

/// Symbol to code mapping. Codes are root-to-leaf paths, `0` left and `1` right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<char, BitString>,
}

impl CodeTable {
    pub fn get(&self, symbol: char) -> Option<&BitString> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &BitString)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Pairwise check that no code is a proper prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&BitString> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || (a != b && !a.is_proper_prefix_of(b)))
        })
    }

    fn insert(&mut self, symbol: char, path: &BitString) {
        let code = if path.is_empty() {
            // lone-leaf tree
            BitString::from(vec![false])
        } else {
            path.clone()
        };
        self.codes.insert(symbol, code);
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in self.iter() {
            writeln!(f, "{symbol:?}: {code}")?;
        }
        Ok(())
    }
}

/// Derive every symbol's code from `tree`.
///
/// `Traversal::Recursive` uses one stack frame per tree level, so its depth is
/// the tree height: at most the number of distinct symbols, and never more
/// than [`MAX_TREE_HEIGHT`](crate::huffman::MAX_TREE_HEIGHT) for a validated
/// tree. `Traversal::Iterative` keeps its own stack on the heap. Both produce
/// the same table.
pub fn derive_codes(tree: &HuffmanTree, traversal: Traversal) -> CodeTable {
    let mut table = CodeTable::default();
    match traversal {
        Traversal::Recursive => {
            let mut path = BitString::new();
            derive_recursive(tree.root(), &mut path, &mut table);
        }
        Traversal::Iterative => derive_iterative(tree.root(), &mut table),
    }
    table
}

fn derive_recursive(node: &HuffNode, path: &mut BitString, table: &mut CodeTable) {
    match node {
        HuffNode::Leaf { symbol, .. } => table.insert(*symbol, path),
        HuffNode::Internal { left, right, .. } => {
            path.push(false);
            derive_recursive(left, path, table);
            path.pop();
            path.push(true);
            derive_recursive(right, path, table);
            path.pop();
        }
    }
}

fn derive_iterative(root: &HuffNode, table: &mut CodeTable) {
    let mut stack = vec![(root, BitString::new())];
    while let Some((node, path)) = stack.pop() {
        match node {
            HuffNode::Leaf { symbol, .. } => table.insert(*symbol, &path),
            HuffNode::Internal { left, right, .. } => {
                let mut right_path = path.clone();
                right_path.push(true);
                let mut left_path = path;
                left_path.push(false);
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }
}

/// Concatenate each symbol's code in input order.
pub fn encode(text: &str, codes: &CodeTable) -> Result<EncodedPayload, CompressError> {
    let mut payload = BitString::new();
    for ch in text.chars() {
        let code = codes.get(ch).ok_or(CompressError::UnknownSymbol(ch))?;
        payload.extend_from(code);
    }
    Ok(payload)
}

/// Walk `tree` bit by bit, emitting a symbol at each leaf and restarting at
/// the root. The payload must end exactly on a leaf.
pub fn decode(payload: &EncodedPayload, tree: &HuffmanTree) -> Result<String, CompressError> {
    let root = tree.root();

    if let HuffNode::Leaf { symbol, .. } = root {
        // Every bit is the lone code `0`.
        return payload
            .iter()
            .enumerate()
            .map(|(i, bit)| {
                if bit {
                    Err(CompressError::MalformedPayload { consumed: i })
                } else {
                    Ok(*symbol)
                }
            })
            .collect();
    }

    let mut output = String::new();
    let mut node = root;
    for bit in payload.iter() {
        node = match node {
            HuffNode::Internal { left, right, .. } => {
                if bit {
                    &**right
                } else {
                    &**left
                }
            }
            HuffNode::Leaf { .. } => unreachable!("walk resets at every leaf"),
        };
        if let HuffNode::Leaf { symbol, .. } = node {
            output.push(*symbol);
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(CompressError::MalformedPayload {
            consumed: payload.len(),
        });
    }
    Ok(output)
}
