use std::collections::{BTreeMap, HashMap};

use bitvec::prelude::*;

use crate::error::{HuffmanError, Result};
use crate::frequency::{Frequencies, count_frequencies};
use crate::tree::{Node, build_tree};

/// A single prefix code, most significant (first emitted) bit first.
pub type Code = BitVec<u8, Msb0>;

/// Renders a code as a string of `0`/`1` characters.
pub fn code_to_string(code: &BitSlice<u8, Msb0>) -> String {
    code.iter().by_vals().map(|bit| if bit { '1' } else { '0' }).collect()
}

/// Symbol to code mapping derived from a Huffman tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the tree depth first, `0` to the left and `1` to the right.
    ///
    /// A root that is itself a leaf gets the code `0`: an empty code could not
    /// be told apart from no symbol at all.
    pub fn from_tree(root: Option<&Node>) -> Self {
        let mut codes = BTreeMap::new();
        let mut stack: Vec<(&Node, Code)> = root.map(|node| (node, Code::new())).into_iter().collect();

        while let Some((node, prefix)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    let code = if prefix.is_empty() { bitvec![u8, Msb0; 0] } else { prefix };
                    codes.insert(*symbol, code);
                }
                Node::Internal { left, right, .. } => {
                    let mut right_prefix = prefix.clone();
                    right_prefix.push(true);
                    stack.push((right, right_prefix));

                    let mut left_prefix = prefix;
                    left_prefix.push(false);
                    stack.push((left, left_prefix));
                }
            }
        }

        Self { codes }
    }

    /// Counts `data`, builds the tree and derives its codes.
    pub fn from_data(data: &[u8]) -> Self {
        let freqs = count_frequencies(data);
        Self::from_tree(build_tree(&freqs).as_ref())
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|code| code.as_bitslice())
    }

    pub fn insert(&mut self, symbol: u8, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_bitslice()))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|code| code.len()).max().unwrap_or(0)
    }

    /// Number of payload bits needed to encode data with these frequencies.
    /// Symbols without a code contribute nothing.
    pub fn encoded_len(&self, freqs: &Frequencies) -> u64 {
        freqs
            .iter()
            .filter_map(|(symbol, &count)| self.codes.get(symbol).map(|code| count * code.len() as u64))
            .sum()
    }

    /// Builds the code to symbol lookup used by the decoder.
    pub fn invert(&self) -> Result<InverseCodeTable> {
        let mut symbols = HashMap::with_capacity(self.codes.len());
        for (&symbol, code) in &self.codes {
            if let Some(first) = symbols.insert(code.clone(), symbol) {
                return Err(HuffmanError::TableCollision {
                    code: code_to_string(code),
                    first,
                    second: symbol,
                });
            }
        }

        Ok(InverseCodeTable {
            symbols,
            max_code_len: self.max_code_len(),
        })
    }
}

/// Code to symbol mapping, the bijective inverse of a [`CodeTable`].
#[derive(Debug, Clone)]
pub struct InverseCodeTable {
    symbols: HashMap<Code, u8>,
    max_code_len: usize,
}

impl InverseCodeTable {
    pub fn lookup(&self, bits: &BitSlice<u8, Msb0>) -> Option<u8> {
        self.symbols.get(bits).copied()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
