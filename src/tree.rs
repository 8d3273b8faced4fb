use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::frequency::Frequencies;

/// A node of the prefix tree. Internal nodes always own exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

// Heap slot. `order` is the insertion sequence number, so equal weights pop
// in the order they were pushed.
struct HeapEntry {
    order: usize,
    node: Node,
}

impl Eq for HeapEntry {}
impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .node
            .weight()
            .cmp(&self.node.weight())
            .then_with(|| other.order.cmp(&self.order))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds the Huffman tree for `freq_map`.
///
/// Returns `None` for an empty map. A map with a single entry yields a lone
/// leaf as the root.
pub fn build_tree(freq_map: &Frequencies) -> Option<Node> {
    let mut heap = BinaryHeap::with_capacity(freq_map.len());
    let mut order = 0;
    for (&symbol, &weight) in freq_map {
        heap.push(HeapEntry {
            order,
            node: Node::Leaf { symbol, weight },
        });
        order += 1;
    }

    loop {
        let left = heap.pop()?;
        let Some(right) = heap.pop() else {
            return Some(left.node);
        };

        heap.push(HeapEntry {
            order,
            node: Node::Internal {
                weight: left.node.weight() + right.node.weight(),
                left: Box::new(left.node),
                right: Box::new(right.node),
            },
        });
        order += 1;
    }
}
