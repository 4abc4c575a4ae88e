//! Huffman tree construction and code generation.
//!
//! The tree is built by repeatedly merging the two lightest nodes taken from a
//! [`MinHeap`]. Ties are broken by a rank: a leaf ranks by its symbol, an
//! internal node ranks after every leaf in the order it was created. The
//! order is therefore total, and the same frequency table always yields the
//! same tree, which is what lets the decoder rebuild the encoder's codes from
//! the header alone.

use std::cmp::Ordering;

use crate::compress::frequency::{FrequencyTable, ALPHABET_SIZE};
use crate::compress::heap::MinHeap;
use crate::error::{Error, Result};

/// Longest code the 64-bit pattern field can hold.
pub const MAX_CODE_LENGTH: usize = 64;

/// Huffman code: (code bits, length in bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    /// The code bits (right-aligned, emitted MSB first).
    pub bits: u64,
    /// Number of bits in the code; 0 means the symbol is absent.
    pub length: u8,
}

impl Code {
    /// True if `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.length == 0 || self.length > other.length {
            return false;
        }
        other.bits >> (other.length - self.length) == self.bits
    }
}

/// Codes for all 256 symbols, indexed by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Code; ALPHABET_SIZE],
}

impl CodeTable {
    fn empty() -> Self {
        Self {
            codes: [Code::default(); ALPHABET_SIZE],
        }
    }

    /// Code for `symbol`; length 0 if the symbol is absent.
    #[inline]
    pub fn get(&self, symbol: u8) -> Code {
        self.codes[symbol as usize]
    }

    /// `(symbol, code)` for every symbol with a code.
    pub fn present(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.length > 0)
            .map(|(symbol, &code)| (symbol as u8, code))
    }

    /// Longest assigned code length.
    pub fn max_length(&self) -> u8 {
        self.codes.iter().map(|c| c.length).max().unwrap_or(0)
    }

    /// Total encoded size in bits of data with the given counts.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .present()
            .map(|(symbol, count)| count * self.get(symbol).length as u64)
            .sum()
    }
}

/// Huffman tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A symbol and its (scaled) frequency.
    Leaf {
        /// Byte value.
        symbol: u8,
        /// Scaled frequency.
        weight: u64,
    },
    /// Merge of two subtrees; weight is the sum of the children's weights.
    Internal {
        /// Sum of both children's weights.
        weight: u64,
        /// Subtree reached by bit 0.
        left: Box<Node>,
        /// Subtree reached by bit 1.
        right: Box<Node>,
    },
}

impl Node {
    /// Frequency of a leaf or summed frequency of a subtree.
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// True for [`Node::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child selected by one bit: `false` = left, `true` = right.
    ///
    /// A leaf returns itself, which is how a single-symbol tree decodes.
    #[inline]
    pub fn child(&self, bit: bool) -> &Node {
        match self {
            Node::Leaf { .. } => self,
            Node::Internal { left, right, .. } => {
                if bit {
                    right.as_ref()
                } else {
                    left.as_ref()
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Heap entry: a subtree plus its tie-break rank.
#[derive(Debug)]
struct Ranked {
    rank: u16,
    node: Node,
}

fn by_weight_then_rank(a: &Ranked, b: &Ranked) -> Ordering {
    a.node
        .weight()
        .cmp(&b.node.weight())
        .then_with(|| a.rank.cmp(&b.rank))
}

/// A Huffman tree owning all of its nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build a tree from a frequency table.
    ///
    /// Returns `None` when the table has no present symbols. The weights are
    /// used exactly as given; callers that write a container header pass the
    /// scaled table so the decoder sees the same weights.
    pub fn build(frequencies: &FrequencyTable) -> Result<Option<Self>> {
        let mut heap = MinHeap::with_capacity(frequencies.distinct(), by_weight_then_rank);
        for (symbol, weight) in frequencies.present() {
            heap.insert(Ranked {
                rank: symbol as u16,
                node: Node::Leaf { symbol, weight },
            })?;
        }
        if heap.is_empty() {
            return Ok(None);
        }

        let mut merges = 0u16;
        while heap.len() >= 2 {
            // First extracted (lighter) goes left, second goes right.
            let left = heap.extract_min()?.node;
            let right = heap.extract_min()?.node;
            heap.insert(Ranked {
                rank: ALPHABET_SIZE as u16 + merges,
                node: Node::Internal {
                    weight: left.weight() + right.weight(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
            })?;
            merges += 1;
        }

        let root = heap.extract_min()?.node;
        Ok(Some(Self { root }))
    }

    /// Root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Assign a code to every leaf: left edge = 0, right edge = 1.
    ///
    /// A tree that is a single leaf gives that symbol the 1-bit code `0`.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::empty();
        assign_codes(&self.root, 0, 0, &mut table)?;
        Ok(table)
    }
}

fn assign_codes(node: &Node, bits: u64, depth: usize, table: &mut CodeTable) -> Result<()> {
    match node {
        Node::Leaf { symbol, .. } => {
            if depth > MAX_CODE_LENGTH {
                return Err(Error::CodeTooLong {
                    symbol: *symbol,
                    length: depth,
                });
            }
            table.codes[*symbol as usize] = Code {
                bits,
                length: depth.max(1) as u8,
            };
            Ok(())
        }
        Node::Internal { left, right, .. } => {
            assign_codes(right, (bits << 1) | 1, depth + 1, table)?;
            assign_codes(left, bits << 1, depth + 1, table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(u8, u64)]) -> FrequencyTable {
        let mut freqs = FrequencyTable::new();
        for &(symbol, count) in pairs {
            freqs.set(symbol, count);
        }
        freqs
    }

    fn check_weights(node: &Node) -> u64 {
        match node {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal {
                weight,
                left,
                right,
            } => {
                let sum = check_weights(left) + check_weights(right);
                assert_eq!(*weight, sum);
                sum
            }
        }
    }

    #[test]
    fn test_empty_table_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyTable::new()).unwrap().is_none());
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let tree = HuffmanTree::build(&table(&[(0x41, 1000)])).unwrap().unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.depth(), 0);

        let codes = tree.code_table().unwrap();
        assert_eq!(codes.get(0x41), Code { bits: 0, length: 1 });
        assert_eq!(codes.present().count(), 1);
    }

    #[test]
    fn test_tie_broken_by_symbol() {
        // "abba": a=2, b=2. 'a' is extracted first and goes left.
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"abba"))
            .unwrap()
            .unwrap();
        let codes = tree.code_table().unwrap();
        assert_eq!(codes.get(b'a'), Code { bits: 0, length: 1 });
        assert_eq!(codes.get(b'b'), Code { bits: 1, length: 1 });
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let freqs = table(&[(0, 5), (1, 2), (2, 1), (3, 1)]);
        let codes = HuffmanTree::build(&freqs).unwrap().unwrap().code_table().unwrap();
        assert_eq!(codes.get(0).length, 1);
        assert_eq!(codes.get(1).length, 2);
        assert_eq!(codes.get(2).length, 3);
        assert_eq!(codes.get(3).length, 3);
        assert_eq!(codes.encoded_bits(&freqs), 5 + 4 + 3 + 3);
    }

    #[test]
    fn test_codes_prefix_free() {
        let freqs = table(&[
            (10, 10),
            (11, 5),
            (12, 3),
            (13, 2),
            (14, 1),
            (15, 1),
            (16, 1),
            (17, 1),
        ]);
        let codes = HuffmanTree::build(&freqs).unwrap().unwrap().code_table().unwrap();
        let present: Vec<_> = codes.present().collect();
        assert_eq!(present.len(), 8);
        for (i, (a, code_a)) in present.iter().enumerate() {
            for (b, code_b) in &present[i + 1..] {
                assert!(
                    !code_a.is_prefix_of(code_b) && !code_b.is_prefix_of(code_a),
                    "Codes {} and {} share prefix",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_weights_conserved() {
        let freqs = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog");
        let tree = HuffmanTree::build(&freqs).unwrap().unwrap();
        assert_eq!(check_weights(tree.root()), freqs.total());
        assert_eq!(tree.root().weight(), freqs.total());
    }

    #[test]
    fn test_build_is_deterministic() {
        let freqs = FrequencyTable::from_bytes(b"mississippi river banks");
        let a = HuffmanTree::build(&freqs).unwrap().unwrap();
        let b = HuffmanTree::build(&freqs).unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.code_table().unwrap(), b.code_table().unwrap());
    }

    #[test]
    fn test_child_walk() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"aab"))
            .unwrap()
            .unwrap();
        // b (weight 1) is lighter, so it is the left child.
        assert_eq!(*tree.root().child(false), Node::Leaf { symbol: b'b', weight: 1 });
        assert_eq!(*tree.root().child(true), Node::Leaf { symbol: b'a', weight: 2 });
    }

    #[test]
    fn test_fibonacci_weights_build_deep_tree() {
        // Fibonacci counts produce the most lopsided tree possible.
        let mut freqs = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..40u8 {
            freqs.set(symbol, a);
            (a, b) = (b, a + b);
        }
        let tree = HuffmanTree::build(&freqs).unwrap().unwrap();
        assert_eq!(tree.depth(), 39);
        assert_eq!(tree.code_table().unwrap().max_length(), 39);
    }

    #[test]
    fn test_code_longer_than_field_rejected() {
        let mut freqs = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..70u8 {
            freqs.set(symbol, a);
            (a, b) = (b, a + b);
        }
        let tree = HuffmanTree::build(&freqs).unwrap().unwrap();
        assert!(tree.depth() > MAX_CODE_LENGTH);
        assert!(matches!(tree.code_table(), Err(Error::CodeTooLong { .. })));
    }

    #[test]
    fn test_is_prefix_of() {
        let short = Code { bits: 0b10, length: 2 };
        let long = Code { bits: 0b1011, length: 4 };
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(!Code { bits: 0b11, length: 2 }.is_prefix_of(&long));
        assert!(!Code::default().is_prefix_of(&long));
    }
}
