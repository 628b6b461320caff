//! The hierarchical sparse/dense storage tree.
//!
//! Compiled kernels address memory through a tree of storage nodes. A node
//! is either a *physical unit* (it owns addressable storage) or a
//! *bit-level* node: a sub-field packed into its parent's physical storage
//! together with its siblings (bit-packed fields, quantized types).

/// Storage-tree node ID within one [`StorageTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StorageNodeId(u32);

impl StorageNodeId {
    /// Create a new node ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the storage tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageNode {
    /// Parent node, `None` for the root. Navigation only — the tree owns
    /// every node.
    pub parent: Option<StorageNodeId>,
    /// Whether this node is a packed sub-field sharing its parent's
    /// physical storage.
    pub is_bit_level: bool,
    /// Number of active iteration dimensions when this node is used as a
    /// struct-for iteration domain.
    pub num_active_indices: usize,
}

/// Arena of storage-tree nodes.
///
/// Nodes refer to their parent by [`StorageNodeId`]; ascent is a loop over
/// `parent` links.
#[derive(Clone, Debug, Default)]
pub struct StorageTree {
    nodes: Vec<StorageNode>,
}

impl StorageTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its ID.
    ///
    /// Panics if `parent` does not already exist (parents must be pushed
    /// before their children).
    #[expect(clippy::cast_possible_truncation, reason = "node counts fit u32")]
    pub fn push(&mut self, node: StorageNode) -> StorageNodeId {
        if let Some(parent) = node.parent {
            assert!(
                parent.index() < self.nodes.len(),
                "storage node parent {} out of bounds (tree has {} nodes)",
                parent.raw(),
                self.nodes.len(),
            );
        }
        let id = StorageNodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Look up a node.
    #[inline]
    pub fn node(&self, id: StorageNodeId) -> &StorageNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ascend from `id` to the nearest ancestor that is not bit-level
    /// (the physical unit whose storage `id` shares).
    ///
    /// Returns `id` itself when it is not bit-level. Panics if a bit-level
    /// node has no parent (a bit-level root is malformed by construction).
    pub fn physical_unit_of(&self, id: StorageNodeId) -> StorageNodeId {
        let mut current = id;
        while self.node(current).is_bit_level {
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => panic!(
                    "bit-level storage node {} has no parent",
                    current.raw()
                ),
            }
        }
        current
    }
}
