//! Aggregation of sub-field verdicts up to physical storage units.
//!
//! Packed sub-fields share one physical storage unit with their siblings,
//! so writing one sub-field reads and rewrites the whole unit. Downstream
//! codegen may only treat the unit as uniquely accessed when *every*
//! packed sub-field touched by the task agrees on one address.
//!
//! For every parallel task in the kernel this pass runs the per-node
//! resolver, then folds each bit-level node's verdict up to its nearest
//! non-bit-level ancestor: sibling verdicts merge by comparing their
//! representative accesses' index tuples element-wise with the same-value
//! oracle, and any disagreement (or any `None` sub-field verdict)
//! downgrades the unit to `None`. Serial tasks are skipped — they get no
//! entry at all.

use rustc_hash::FxHashMap;

use karst_ir::{Kernel, StmtId, StmtKind, StorageTree, TaskKind};

use crate::access_unique::{gather_uniquely_accessed_pointers, UniqueAccessMap};
use crate::manager::{AnalysisManager, Pass};
use crate::UniquenessOracle;

/// Aggregated verdicts: per parallel task, per physical storage unit.
pub type BitStructVerdicts = FxHashMap<StmtId, UniqueAccessMap>;

/// Pass identity for [`gather_uniquely_accessed_bit_structs`] results in
/// an [`AnalysisManager`].
pub struct GatherUniquelyAccessedBitStructsPass;

impl Pass for GatherUniquelyAccessedBitStructsPass {
    const ID: &'static str = "gather_uniquely_accessed_bit_structs";
    type Output = BitStructVerdicts;
}

/// Run the resolver for every parallel task and aggregate bit-level
/// verdicts per physical storage unit, storing the result in `manager`
/// under [`GatherUniquelyAccessedBitStructsPass::ID`].
///
/// Each top-level task is analyzed independently and exactly once; the
/// walk never descends into nested task boundaries.
pub fn gather_uniquely_accessed_bit_structs(
    kernel: &Kernel,
    tree: &StorageTree,
    oracle: &dyn UniquenessOracle,
    manager: &mut AnalysisManager,
) {
    let mut result = BitStructVerdicts::default();

    for &task in kernel.tasks() {
        match kernel.task_kind(task) {
            TaskKind::RangeFor | TaskKind::MeshFor | TaskKind::StructFor { .. } => {}
            TaskKind::Serial => continue,
        }

        let per_node = gather_uniquely_accessed_pointers(kernel, tree, task, oracle);
        let folded = result.entry(task).or_default();

        for (&node, &verdict) in &per_node {
            if !tree.node(node).is_bit_level {
                continue;
            }
            let unit = tree.physical_unit_of(node);
            match folded.get(&unit).copied() {
                None => {
                    folded.insert(unit, verdict);
                }
                Some(existing) => {
                    folded.insert(unit, merge_sub_field(kernel, existing, verdict, oracle));
                }
            }
        }
    }

    tracing::debug!(tasks = result.len(), "aggregated bit-struct uniqueness");
    manager.put_pass_result::<GatherUniquelyAccessedBitStructsPass>(result);
}

/// Merge the verdicts of two packed sub-fields of one physical unit.
///
/// `None` absorbs. Two representatives survive only when their index
/// tuples match element-wise under the same-value oracle; the comparison
/// is positional (swapped but equal dimensions do not match). Index
/// arity mismatch between siblings is a fatal IR contract violation.
fn merge_sub_field(
    kernel: &Kernel,
    existing: Option<StmtId>,
    incoming: Option<StmtId>,
    oracle: &dyn UniquenessOracle,
) -> Option<StmtId> {
    let (Some(previous), Some(current)) = (existing, incoming) else {
        return None;
    };
    let previous_indices = access_indices(kernel, previous);
    let current_indices = access_indices(kernel, current);
    assert_eq!(
        previous_indices.len(),
        current_indices.len(),
        "packed sub-fields of one unit accessed with different index arity",
    );
    let all_same = previous_indices
        .iter()
        .zip(current_indices)
        .all(|(&a, &b)| oracle.same_value(a, b));
    if all_same {
        Some(previous)
    } else {
        None
    }
}

/// The index tuple of a representative access.
///
/// Representatives come out of the resolver and are storage accesses by
/// construction.
fn access_indices(kernel: &Kernel, access: StmtId) -> &[StmtId] {
    match kernel.stmt(access) {
        StmtKind::StorageAccess { indices, .. } => indices,
        other => panic!(
            "representative {} is not a storage access: {other:?}",
            access.raw()
        ),
    }
}
