//! Loop-invariance and loop-uniqueness classification of task bodies.
//!
//! Walks one task boundary's body and classifies each value-producing
//! statement as **loop-invariant** (same value on every iteration) or
//! **loop-unique** (distinct value on every iteration, optionally tied to
//! one iteration dimension). Statements that fit neither class stay
//! unclassified, which is always sound.
//!
//! # Algorithm
//!
//! A single forward pass — production order is a topological order of the
//! expression DAG, so every operand is classified before its users:
//!
//! - Constants are invariant.
//! - A loop index of the analyzed task is unique to its dimension.
//! - An explicit loop-unique hint is unique with no dimension association.
//! - `neg` of a unique value stays unique (negation is injective); any
//!   unary of an invariant value stays invariant.
//! - `add`/`sub`/`bit_xor` of one unique and one invariant operand (either
//!   order) inherit the unique operand's tag — injective in one operand
//!   when the other is fixed; any binary of two invariants is invariant.
//!
//! No other operator propagates uniqueness. The operator lists are a
//! deliberate under-approximation and must not be extended without an
//! injectivity argument.

use rustc_hash::{FxHashMap, FxHashSet};

use karst_ir::{BinaryOp, Kernel, StmtId, StmtKind, UnaryOp};

/// Why a statement's value is distinct on every loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniqueTag {
    /// Provably unique, no dimension association (from an upstream hint).
    Opaque,
    /// Unique because it varies exactly with the `d`-th loop index.
    Dim(usize),
}

/// Classification maps for one task body.
///
/// Scoped to exactly one task boundary; rebuilt from scratch per task and
/// discarded after the access-uniqueness pass consumes it.
pub struct LoopUniqueScanner {
    /// Values that do not change across iterations.
    loop_invariant: FxHashSet<StmtId>,
    /// Values distinct on every iteration, with the reason.
    loop_unique: FxHashMap<StmtId, UniqueTag>,
    /// Total number of iteration dimensions of the analyzed task.
    num_loop_dims: usize,
}

impl LoopUniqueScanner {
    /// Classify the body of `task` in one forward pass.
    ///
    /// `num_loop_dims` is the task's iteration-dimension count (1 for
    /// range/mesh loops, the domain's active dimension count for struct
    /// loops, 0 for serial tasks) and is fixed for the scanner's lifetime.
    pub fn scan(kernel: &Kernel, task: StmtId, num_loop_dims: usize) -> Self {
        let mut scanner = Self {
            loop_invariant: FxHashSet::default(),
            loop_unique: FxHashMap::default(),
            num_loop_dims,
        };
        for &stmt in kernel.task_body(task) {
            scanner.visit(kernel, task, stmt);
        }
        scanner
    }

    fn visit(&mut self, kernel: &Kernel, task: StmtId, stmt: StmtId) {
        match kernel.stmt(stmt) {
            StmtKind::Const { .. } => {
                self.loop_invariant.insert(stmt);
            }

            // Only indices of the analyzed task carry a dimension tag;
            // an index of an inner (nested) loop is neither invariant nor
            // unique across the task's iteration space.
            StmtKind::LoopIndex { task: owner, index } => {
                if *owner == task {
                    self.loop_unique.insert(stmt, UniqueTag::Dim(*index));
                }
            }

            StmtKind::LoopUnique { .. } => {
                self.loop_unique.insert(stmt, UniqueTag::Opaque);
            }

            StmtKind::Unary { op, operand } => {
                if self.loop_invariant.contains(operand) {
                    self.loop_invariant.insert(stmt);
                }
                if *op == UnaryOp::Neg {
                    if let Some(tag) = self.loop_unique.get(operand).copied() {
                        self.loop_unique.insert(stmt, tag);
                    }
                }
            }

            StmtKind::Binary { op, lhs, rhs } => {
                if self.loop_invariant.contains(lhs) && self.loop_invariant.contains(rhs) {
                    self.loop_invariant.insert(stmt);
                }
                if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::BitXor) {
                    let inherited = if self.loop_invariant.contains(rhs) {
                        self.loop_unique.get(lhs).copied()
                    } else if self.loop_invariant.contains(lhs) {
                        self.loop_unique.get(rhs).copied()
                    } else {
                        None
                    };
                    if let Some(tag) = inherited {
                        self.loop_unique.insert(stmt, tag);
                    }
                }
            }

            // No information about accesses, nested tasks, or unmodeled
            // statements.
            StmtKind::StorageAccess { .. } | StmtKind::Task { .. } | StmtKind::Opaque => {}
        }
    }

    /// Is `access`'s full index tuple injective across the iteration
    /// space?
    ///
    /// True when any index carries an [`UniqueTag::Opaque`] tag, or when
    /// the distinct dimension tags among the indices cover every iteration
    /// dimension. Indexing the same dimension twice (`a[i, i]` in a loop
    /// over `i, j`) leaves a dimension unaccounted for and is not unique.
    ///
    /// Panics if `access` is not a storage-access statement.
    pub fn is_access_loop_unique(&self, kernel: &Kernel, access: StmtId) -> bool {
        let StmtKind::StorageAccess { indices, .. } = kernel.stmt(access) else {
            panic!("statement {} is not a storage access", access.raw());
        };
        self.is_index_tuple_loop_unique(indices)
    }

    /// [`Self::is_access_loop_unique`], on a raw index tuple.
    pub fn is_index_tuple_loop_unique(&self, indices: &[StmtId]) -> bool {
        let mut dims = Vec::with_capacity(indices.len());
        for index in indices {
            match self.loop_unique.get(index) {
                Some(UniqueTag::Opaque) => return true,
                Some(UniqueTag::Dim(d)) => dims.push(*d),
                None => {}
            }
        }
        dims.sort_unstable();
        dims.dedup();
        dims.len() == self.num_loop_dims
    }

    /// Whether `stmt` was classified loop-invariant.
    pub fn is_loop_invariant(&self, stmt: StmtId) -> bool {
        self.loop_invariant.contains(&stmt)
    }

    /// The uniqueness tag of `stmt`, if it was classified loop-unique.
    pub fn unique_tag(&self, stmt: StmtId) -> Option<UniqueTag> {
        self.loop_unique.get(&stmt).copied()
    }
}

#[cfg(test)]
mod tests;
