//! Byte-keyed prefix tree mapping station names to their aggregators.
//!
//! Nodes live in a flat arena and refer to children by arena position. Each
//! node may own a 256-wide child table, indexed directly by the next byte, and
//! an aggregator for the name ending at that node. Both are allocated the first
//! time they are needed. Visiting child slots in ascending order yields names
//! in raw byte order, so the report needs no separate sort.

use crate::aggregator::Aggregator;

/// Child slot value for "no child". The root sits at arena position 0 and is
/// never a child, so 0 is free to use.
const NO_CHILD: u32 = 0;

/// Position of a node in the index arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
struct Node {
    children: Option<Box<[u32; 256]>>,
    leaf: Option<Aggregator>,
}

#[derive(Debug)]
pub struct NameIndex {
    nodes: Vec<Node>,
    leaves: usize,
}

impl NameIndex {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            leaves: 0,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Child of `node` for `byte`, created empty if absent.
    #[inline]
    pub fn descend(&mut self, node: NodeId, byte: u8) -> NodeId {
        let next_id = self.nodes.len();
        let children = self.nodes[node.get()]
            .children
            .get_or_insert_with(|| Box::new([NO_CHILD; 256]));
        let slot = &mut children[byte as usize];
        if *slot != NO_CHILD {
            return NodeId(*slot);
        }
        let id = u32::try_from(next_id).expect("name index exceeded u32::MAX nodes");
        *slot = id;
        self.nodes.push(Node::default());
        NodeId(id)
    }

    /// Aggregator owned by `node`, created with initial values if absent.
    #[inline]
    pub fn leaf_of(&mut self, node: NodeId) -> &mut Aggregator {
        let leaf = &mut self.nodes[node.get()].leaf;
        if leaf.is_none() {
            self.leaves += 1;
        }
        leaf.get_or_insert_with(Aggregator::new)
    }

    pub fn leaf(&self, node: NodeId) -> Option<&Aggregator> {
        self.nodes[node.get()].leaf.as_ref()
    }

    /// Walks `name` from the root without creating anything.
    pub fn lookup(&self, name: &[u8]) -> Option<&Aggregator> {
        let mut node = self.root();
        for &byte in name {
            node = self.child(node, byte)?;
        }
        self.leaf(node)
    }

    pub fn insert(&mut self, name: &[u8]) -> &mut Aggregator {
        let node = name
            .iter()
            .fold(self.root(), |node, &byte| self.descend(node, byte));
        self.leaf_of(node)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.leaves
    }

    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All `(name, aggregator)` pairs in ascending byte order of the name.
    pub fn traverse_sorted(&self) -> SortedEntries<'_> {
        SortedEntries {
            index: self,
            stack: vec![Frame::enter(NodeId::ROOT)],
            name: Vec::new(),
        }
    }

    fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let children = self.nodes[node.get()].children.as_deref()?;
        match children[byte as usize] {
            NO_CHILD => None,
            id => Some(NodeId(id)),
        }
    }

    /// First existing child of `node` at byte `from` or above.
    fn next_child(&self, node: NodeId, from: usize) -> Option<(u8, NodeId)> {
        let children = self.nodes[node.get()].children.as_deref()?;
        children
            .iter()
            .enumerate()
            .skip(from)
            .find(|&(_, &id)| id != NO_CHILD)
            .map(|(byte, &id)| (byte as u8, NodeId(id)))
    }
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::new()
    }
}

struct Frame {
    node: NodeId,
    /// Next child byte to try, 256 once exhausted.
    next: usize,
    leaf_pending: bool,
}

impl Frame {
    fn enter(node: NodeId) -> Self {
        Self {
            node,
            next: 0,
            leaf_pending: true,
        }
    }
}

/// Depth-first walk over a [`NameIndex`] driven by an explicit stack.
///
/// A node's own leaf is produced before its children, so `ab` comes before
/// `abc`, which comes before `ac`.
pub struct SortedEntries<'a> {
    index: &'a NameIndex,
    stack: Vec<Frame>,
    name: Vec<u8>,
}

impl<'a> Iterator for SortedEntries<'a> {
    type Item = (Vec<u8>, &'a Aggregator);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        loop {
            let frame = self.stack.last_mut()?;

            if frame.leaf_pending {
                frame.leaf_pending = false;
                if let Some(leaf) = index.leaf(frame.node) {
                    return Some((self.name.clone(), leaf));
                }
            }

            match index.next_child(frame.node, frame.next) {
                Some((byte, child)) => {
                    frame.next = byte as usize + 1;
                    self.name.push(byte);
                    self.stack.push(Frame::enter(child));
                }
                None => {
                    self.stack.pop();
                    if !self.stack.is_empty() {
                        self.name.pop();
                    }
                }
            }
        }
    }
}
