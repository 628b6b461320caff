//! Shared test utilities for the uniqueness analyzers.
//!
//! Factory functions for hand-building kernels and storage trees, plus a
//! programmable [`ScriptedOracle`]. Only compiled in test builds.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use karst_ir::{Kernel, StmtId, StmtKind, StorageNode, StorageNodeId, StorageTree, TaskKind};

use crate::UniquenessOracle;

/// Push a constant into `task`'s body.
pub(crate) fn constant(kernel: &mut Kernel, task: StmtId, value: i64) -> StmtId {
    kernel.push_in_task(task, StmtKind::Const { value })
}

/// Push the `index`-th loop index of `task` into its own body.
pub(crate) fn loop_index(kernel: &mut Kernel, task: StmtId, index: usize) -> StmtId {
    kernel.push_in_task(task, StmtKind::LoopIndex { task, index })
}

/// Push a storage access into `task`'s body.
pub(crate) fn access(
    kernel: &mut Kernel,
    task: StmtId,
    nodes: &[StorageNodeId],
    indices: &[StmtId],
) -> StmtId {
    kernel.push_in_task(
        task,
        StmtKind::StorageAccess {
            nodes: SmallVec::from_slice(nodes),
            indices: indices.to_vec(),
        },
    )
}

/// Append a storage node to `tree`.
pub(crate) fn field(
    tree: &mut StorageTree,
    parent: Option<StorageNodeId>,
    is_bit_level: bool,
) -> StorageNodeId {
    tree.push(StorageNode {
        parent,
        is_bit_level,
        num_active_indices: 0,
    })
}

/// Append a root iteration-domain node with `dims` active dimensions.
pub(crate) fn domain(tree: &mut StorageTree, dims: usize) -> StorageNodeId {
    tree.push(StorageNode {
        parent: None,
        is_bit_level: false,
        num_active_indices: dims,
    })
}

/// Create a two-dimensional struct-for task over a fresh domain node.
///
/// Returns `(task, i, j)` where `i`/`j` are the task's loop indices.
pub(crate) fn struct_for_2d(kernel: &mut Kernel, tree: &mut StorageTree) -> (StmtId, StmtId, StmtId) {
    let dom = domain(tree, 2);
    let task = kernel.push_task(TaskKind::StructFor { domain: dom });
    let i = loop_index(kernel, task, 0);
    let j = loop_index(kernel, task, 1);
    (task, i, j)
}

/// Oracle with scripted positive answers; everything else falls back to
/// statement identity.
#[derive(Default)]
pub(crate) struct ScriptedOracle {
    same_address: FxHashSet<(StmtId, StmtId)>,
    same_value: FxHashSet<(StmtId, StmtId)>,
}

impl ScriptedOracle {
    pub(crate) fn assume_same_address(&mut self, a: StmtId, b: StmtId) {
        self.same_address.insert((a, b));
        self.same_address.insert((b, a));
    }

    pub(crate) fn assume_same_value(&mut self, a: StmtId, b: StmtId) {
        self.same_value.insert((a, b));
        self.same_value.insert((b, a));
    }
}

impl UniquenessOracle for ScriptedOracle {
    fn definitely_same_address(&self, a: StmtId, b: StmtId) -> bool {
        a == b || self.same_address.contains(&(a, b))
    }

    fn same_value(&self, a: StmtId, b: StmtId) -> bool {
        a == b || self.same_value.contains(&(a, b))
    }
}
