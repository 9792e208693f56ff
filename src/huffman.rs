//! Huffman tree construction
//!
//! Classic greedy merge over a min-heap. Ties on weight resolve by sequence
//! number: leaves take their first-seen position in the frequency map, merged
//! nodes take increasing numbers after all leaves. Identical input therefore
//! always yields an identical tree.
//!
//! Trees serialize as a flat pre-order node list and are rebuilt with an
//! explicit stack, so loading never recurses on untrusted depth.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CompressError;
use crate::frequency::FrequencyMap;

/// Deepest tree accepted from outside the builder.
///
/// A tree built from `u64` weights is at most about 90 levels deep, so this
/// only rejects hand-made or corrupted trees. Recursive traversals stay within
/// this many frames.
pub const MAX_TREE_HEIGHT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: char,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: char, weight: u64) -> Self {
        HuffNode::Leaf { symbol, weight }
    }

    /// Join two subtrees; `left` is the first-selected (lighter) node.
    pub fn merge(left: HuffNode, right: HuffNode) -> Result<Self, CompressError> {
        let weight = left
            .weight()
            .checked_add(right.weight())
            .ok_or(CompressError::WeightOverflow)?;
        Ok(HuffNode::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }
}

impl Drop for HuffNode {
    // Unlink children onto a heap stack so a deep chain drops in constant depth.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

fn detach_children(node: &mut HuffNode, pending: &mut Vec<HuffNode>) {
    if let HuffNode::Internal { left, right, .. } = node {
        for child in [left, right] {
            if !child.is_leaf() {
                pending.push(std::mem::replace(&mut **child, HuffNode::leaf('\0', 0)));
            }
        }
    }
}

/// One node of a tree in pre-order: an internal node is followed by its left
/// subtree, then its right subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatNode {
    Leaf { symbol: char, weight: u64 },
    Internal { weight: u64 },
}

/// Working-set entry. Ordered so `BinaryHeap` pops the lightest, oldest node.
struct HeapEntry {
    weight: u64,
    seq: usize,
    node: HuffNode,
}

impl Eq for HeapEntry {}
impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// An immutable prefix-code tree.
///
/// A text with a single distinct symbol produces a lone leaf as root; that
/// symbol's code is `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FlatNode>", into = "Vec<FlatNode>")]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Build from a frequency map. An empty map is an error; callers are
    /// expected to reject empty input before getting here.
    pub fn build(freq: &FrequencyMap) -> Result<Self, CompressError> {
        if freq.is_empty() {
            return Err(CompressError::EmptyInput);
        }

        let mut heap: BinaryHeap<HeapEntry> = freq
            .iter()
            .enumerate()
            .map(|(seq, (symbol, weight))| HeapEntry {
                weight,
                seq,
                node: HuffNode::leaf(symbol, weight),
            })
            .collect();
        let mut next_seq = heap.len();

        while heap.len() > 1 {
            let (Some(first), Some(second)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let node = HuffNode::merge(first.node, second.node)?;
            tracing::trace!(weight = node.weight(), seq = next_seq, "merged nodes");
            heap.push(HeapEntry {
                weight: node.weight(),
                seq: next_seq,
                node,
            });
            next_seq += 1;
        }

        let root = heap
            .pop()
            .map(|entry| entry.node)
            .ok_or(CompressError::EmptyInput)?;
        let tree = Self { root };
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                symbols = freq.len(),
                weight = tree.weight(),
                height = tree.height(),
                "built huffman tree"
            );
        }
        Ok(tree)
    }

    /// Wrap a root built elsewhere, checking it with [`HuffmanTree::validate`].
    pub fn from_root(root: HuffNode) -> Result<Self, CompressError> {
        let tree = Self { root };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Root weight: total symbol count of the text the tree was built from.
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn is_single_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    /// Longest root-to-leaf path, in edges. Bounded by the number of distinct
    /// symbols and by [`MAX_TREE_HEIGHT`], which also bounds recursion depth in
    /// code derivation.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                HuffNode::Leaf { .. } => max = max.max(depth),
                HuffNode::Internal { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        max
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { .. } => count += 1,
                HuffNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        count
    }

    /// Check that every internal weight is the sum of its children, that no
    /// symbol labels two leaves and that the height is within [`MAX_TREE_HEIGHT`].
    pub fn validate(&self) -> Result<(), CompressError> {
        let mut seen = HashSet::new();
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_TREE_HEIGHT {
                return Err(CompressError::MalformedTree(format!(
                    "tree height exceeds {MAX_TREE_HEIGHT}"
                )));
            }
            match node {
                HuffNode::Leaf { symbol, .. } => {
                    if !seen.insert(*symbol) {
                        return Err(CompressError::MalformedTree(format!(
                            "symbol {symbol:?} appears in more than one leaf"
                        )));
                    }
                }
                HuffNode::Internal {
                    weight,
                    left,
                    right,
                } => {
                    let sum = left.weight().checked_add(right.weight());
                    if sum != Some(*weight) {
                        return Err(CompressError::MalformedTree(format!(
                            "internal weight {weight} != {} + {}",
                            left.weight(),
                            right.weight()
                        )));
                    }
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        Ok(())
    }

    /// Pre-order node list, the serialized form.
    pub fn flatten(&self) -> Vec<FlatNode> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol, weight } => out.push(FlatNode::Leaf {
                    symbol: *symbol,
                    weight: *weight,
                }),
                HuffNode::Internal {
                    weight,
                    left,
                    right,
                } => {
                    out.push(FlatNode::Internal { weight: *weight });
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    /// Rebuild from a pre-order node list, bottom-up from the end, rejecting
    /// anything deeper than [`MAX_TREE_HEIGHT`] before it is linked.
    pub fn unflatten(nodes: Vec<FlatNode>) -> Result<Self, CompressError> {
        let mut stack: Vec<(HuffNode, usize)> = Vec::new();
        for flat in nodes.into_iter().rev() {
            match flat {
                FlatNode::Leaf { symbol, weight } => stack.push((HuffNode::leaf(symbol, weight), 0)),
                FlatNode::Internal { weight } => {
                    let (Some((left, lh)), Some((right, rh))) = (stack.pop(), stack.pop()) else {
                        return Err(CompressError::MalformedTree(
                            "internal node is missing a child".into(),
                        ));
                    };
                    let height = lh.max(rh) + 1;
                    if height > MAX_TREE_HEIGHT {
                        return Err(CompressError::MalformedTree(format!(
                            "tree height exceeds {MAX_TREE_HEIGHT}"
                        )));
                    }
                    let node = HuffNode::Internal {
                        weight,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    stack.push((node, height));
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some((root, _)), true) => Self::from_root(root),
            _ => Err(CompressError::MalformedTree(
                "node list does not form a single tree".into(),
            )),
        }
    }
}

impl From<HuffmanTree> for Vec<FlatNode> {
    fn from(tree: HuffmanTree) -> Self {
        tree.flatten()
    }
}

impl TryFrom<Vec<FlatNode>> for HuffmanTree {
    type Error = CompressError;

    fn try_from(nodes: Vec<FlatNode>) -> Result<Self, Self::Error> {
        Self::unflatten(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(text: &str) -> HuffmanTree {
        HuffmanTree::build(&FrequencyMap::analyze(text)).unwrap()
    }

    fn join(left: HuffNode, right: HuffNode) -> HuffNode {
        HuffNode::merge(left, right).unwrap()
    }

    /// Left-leaning chain of `depth` internal nodes over distinct leaves.
    fn chain(depth: usize) -> HuffNode {
        let mut node = HuffNode::leaf('\u{100}', 0);
        for i in 0..depth {
            let symbol = char::from_u32(0x10000 + i as u32).unwrap();
            node = HuffNode::Internal {
                weight: 0,
                left: Box::new(node),
                right: Box::new(HuffNode::leaf(symbol, 0)),
            };
        }
        node
    }

    #[test]
    fn test_empty_map_rejected() {
        let result = HuffmanTree::build(&FrequencyMap::new());
        assert!(matches!(result, Err(CompressError::EmptyInput)));
    }

    #[test]
    fn test_single_symbol_is_lone_leaf() {
        let tree = build("aaaa");
        assert!(tree.is_single_leaf());
        assert_eq!(tree.root(), &HuffNode::leaf('a', 4));
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_two_symbols_first_seen_goes_left() {
        let tree = build("ba");
        let expected = join(HuffNode::leaf('b', 1), HuffNode::leaf('a', 1));
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_lighter_node_goes_left() {
        let tree = build("abb");
        let expected = join(HuffNode::leaf('a', 1), HuffNode::leaf('b', 2));
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_leaf_beats_newer_internal_on_tie() {
        // a:1 b:1 merge into weight 2, which ties with c:2. c was seen first.
        let tree = build("abcc");
        let expected = join(
            HuffNode::leaf('c', 2),
            join(HuffNode::leaf('a', 1), HuffNode::leaf('b', 1)),
        );
        assert_eq!(tree.root(), &expected);
    }

    #[test]
    fn test_weight_conservation() {
        let text = "the quick brown fox jumps over the lazy dog";
        let tree = build(text);
        assert_eq!(tree.weight(), text.chars().count() as u64);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_leaf_count_and_height_bound() {
        let text = "abracadabra";
        let tree = build(text);
        let distinct = FrequencyMap::analyze(text).len();
        assert_eq!(tree.leaf_count(), distinct);
        assert!(tree.height() < distinct);
    }

    #[test]
    fn test_deterministic() {
        let text = "mississippi river";
        assert_eq!(build(text), build(text));
    }

    #[test]
    fn test_validate_rejects_bad_weight() {
        let root = HuffNode::Internal {
            weight: 5,
            left: Box::new(HuffNode::leaf('a', 1)),
            right: Box::new(HuffNode::leaf('b', 1)),
        };
        assert!(matches!(
            HuffmanTree::from_root(root),
            Err(CompressError::MalformedTree(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_symbol() {
        let root = join(HuffNode::leaf('a', 1), HuffNode::leaf('a', 1));
        assert!(matches!(
            HuffmanTree::from_root(root),
            Err(CompressError::MalformedTree(_))
        ));
    }

    #[test]
    fn test_merge_overflow() {
        let result = HuffNode::merge(HuffNode::leaf('a', u64::MAX), HuffNode::leaf('b', 1));
        assert!(matches!(result, Err(CompressError::WeightOverflow)));
    }

    #[test]
    fn test_build_at_weight_limit() {
        let freq = FrequencyMap::from_counts([('a', u64::MAX - 1), ('b', 1)]).unwrap();
        let tree = HuffmanTree::build(&freq).unwrap();
        assert_eq!(tree.weight(), u64::MAX);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_flatten_preorder() {
        let tree = build("abb");
        assert_eq!(
            tree.flatten(),
            vec![
                FlatNode::Internal { weight: 3 },
                FlatNode::Leaf { symbol: 'a', weight: 1 },
                FlatNode::Leaf { symbol: 'b', weight: 2 },
            ]
        );
        assert_eq!(HuffmanTree::unflatten(tree.flatten()).unwrap(), tree);
    }

    #[test]
    fn test_unflatten_rejects_bad_shapes() {
        let missing_child = vec![FlatNode::Internal { weight: 1 }, FlatNode::Leaf { symbol: 'a', weight: 1 }];
        let two_roots = vec![
            FlatNode::Leaf { symbol: 'a', weight: 1 },
            FlatNode::Leaf { symbol: 'b', weight: 1 },
        ];
        for nodes in [missing_child, two_roots, Vec::new()] {
            assert!(matches!(
                HuffmanTree::unflatten(nodes),
                Err(CompressError::MalformedTree(_))
            ));
        }
    }

    #[test]
    fn test_unflatten_rejects_deep_chain() {
        let depth = 200_000;
        let mut nodes = vec![FlatNode::Internal { weight: 0 }; depth];
        nodes.extend((0..=depth as u32).map(|i| FlatNode::Leaf {
            symbol: char::from_u32(0x10000 + i).unwrap(),
            weight: 0,
        }));
        let result = HuffmanTree::unflatten(nodes);
        assert!(matches!(result, Err(CompressError::MalformedTree(msg)) if msg.contains("height")));
    }

    #[test]
    fn test_from_root_rejects_and_drops_deep_chain() {
        let result = HuffmanTree::from_root(chain(200_000));
        assert!(matches!(result, Err(CompressError::MalformedTree(_))));
    }

    #[test]
    fn test_height_limit_is_inclusive() {
        let tree = HuffmanTree::from_root(chain(MAX_TREE_HEIGHT)).unwrap();
        assert_eq!(tree.height(), MAX_TREE_HEIGHT);
        assert!(HuffmanTree::from_root(chain(MAX_TREE_HEIGHT + 1)).is_err());
    }

    #[test]
    fn test_json_form_is_validated() {
        let tree = build("hello");
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(serde_json::from_str::<HuffmanTree>(&json).unwrap(), tree);

        let bad = r#"[{"Internal":{"weight":5}},{"Leaf":{"symbol":"a","weight":1}},{"Leaf":{"symbol":"b","weight":1}}]"#;
        let err = serde_json::from_str::<HuffmanTree>(bad).unwrap_err();
        assert!(err.to_string().contains("malformed tree"));
    }
}
