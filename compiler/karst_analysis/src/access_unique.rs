//! Per-storage-node access-uniqueness resolution for one task.
//!
//! A storage-tree node is *uniquely accessed* within a task when every
//! access to it resolves to one loop-unique address: either there is a
//! single accessing expression whose index tuple is injective across the
//! iteration space, or all accessing expressions provably denote the same
//! address on every iteration.
//!
//! # Algorithm
//!
//! One forward pass over the task body with a monotonic three-state
//! lattice per storage node:
//!
//! ```text
//! Unknown  ──unique access──▶  UniqueWith(access)  ──conflict──▶  NotUnique
//!    └──────────────── non-unique access ─────────────────────────────┘
//! ```
//!
//! `NotUnique` is absorbing, so re-running the pass over the same IR
//! never upgrades a verdict and the fixed point is independent of the
//! order in which accesses or candidate nodes are visited.
//!
//! # Known gap
//!
//! Storage-node operation statements (activation, deactivation, length
//! queries) also touch storage nodes but lower to opaque statements and
//! are invisible here; their targets keep whatever verdict the direct
//! accesses produce.

use rustc_hash::FxHashMap;

use karst_ir::{Kernel, StmtId, StmtKind, StorageNodeId, StorageTree, TaskKind};

use crate::value_unique::LoopUniqueScanner;
use crate::UniquenessOracle;

/// Per-node verdict for every storage node touched by a task.
///
/// `Some(access)` — all accesses to this node provably target the single
/// loop-unique address computed by `access`. `None` — proven not uniquely
/// accessed.
pub type UniqueAccessMap = FxHashMap<StorageNodeId, Option<StmtId>>;

/// Per-node state during resolution.
///
/// The public result collapses `UniqueWith`/`NotUnique` into
/// `Some`/`None`; `Unknown` exists only between an entry's creation and
/// its first resolution and never survives the pass (every touched node
/// is resolved by the access that touched it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Unknown,
    UniqueWith(StmtId),
    NotUnique,
}

/// The iteration-dimension count of `task`.
///
/// Range and mesh loops iterate one dimension; a struct loop iterates its
/// domain node's active dimensions; a serial task iterates none (and
/// every access in it is trivially iteration-distinguishable).
pub fn num_loop_dims(kernel: &Kernel, tree: &StorageTree, task: StmtId) -> usize {
    match kernel.task_kind(task) {
        TaskKind::RangeFor | TaskKind::MeshFor => 1,
        TaskKind::StructFor { domain } => tree.node(domain).num_active_indices,
        TaskKind::Serial => 0,
    }
}

/// Resolve, for every storage-tree node accessed in `task`, whether all
/// accesses to it target a single loop-unique address.
///
/// Panics if `task` is not a task-boundary statement.
pub fn gather_uniquely_accessed_pointers(
    kernel: &Kernel,
    tree: &StorageTree,
    task: StmtId,
    oracle: &dyn UniquenessOracle,
) -> UniqueAccessMap {
    let scanner = LoopUniqueScanner::scan(kernel, task, num_loop_dims(kernel, tree, task));

    let mut verdicts: FxHashMap<StorageNodeId, Verdict> = FxHashMap::default();
    for &stmt in kernel.task_body(task) {
        let StmtKind::StorageAccess { nodes, indices } = kernel.stmt(stmt) else {
            continue;
        };
        for &node in nodes {
            let entry = verdicts.entry(node).or_insert(Verdict::Unknown);
            *entry = match *entry {
                Verdict::Unknown => {
                    if scanner.is_index_tuple_loop_unique(indices) {
                        Verdict::UniqueWith(stmt)
                    } else {
                        Verdict::NotUnique
                    }
                }
                Verdict::UniqueWith(previous) => {
                    if oracle.definitely_same_address(previous, stmt) {
                        Verdict::UniqueWith(previous)
                    } else {
                        Verdict::NotUnique
                    }
                }
                Verdict::NotUnique => Verdict::NotUnique,
            };
        }
    }

    tracing::debug!(
        task = task.raw(),
        nodes = verdicts.len(),
        unique = verdicts
            .values()
            .filter(|v| matches!(v, Verdict::UniqueWith(_)))
            .count(),
        "resolved access uniqueness"
    );

    verdicts
        .into_iter()
        .map(|(node, verdict)| {
            let resolved = match verdict {
                Verdict::UniqueWith(access) => Some(access),
                Verdict::NotUnique => None,
                Verdict::Unknown => {
                    unreachable!("storage node {} touched but never resolved", node.raw())
                }
            };
            (node, resolved)
        })
        .collect()
}
