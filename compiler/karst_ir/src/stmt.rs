//! Statement kinds for the Karst kernel IR.
//!
//! A kernel body is a DAG of value-producing statements stored flat in a
//! [`Kernel`](crate::Kernel) arena. Statement variants the analysis passes
//! do not model (stores, atomics, storage-node operation statements, inner
//! serial loops) all lower to [`StmtKind::Opaque`]; passes that match on
//! `StmtKind` treat `Opaque` as "no information" rather than an error.

use smallvec::SmallVec;

use crate::tree::StorageNodeId;

/// Statement ID within one [`Kernel`](crate::Kernel).
///
/// IDs are allocated sequentially starting from 0 and are stable for the
/// lifetime of the kernel (the arena is append-only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    /// Create a new statement ID from a raw index.
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

/// Unary operator on kernel values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation. Injective.
    Neg,
    /// Bitwise/logical not.
    Not,
    /// Absolute value.
    Abs,
    /// Numeric cast (exact representation not tracked here).
    Cast,
}

/// Binary operator on kernel values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Min,
    Max,
}

/// Kind of a task boundary — one scheduled unit of parallel work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Runs once, no parallel iteration.
    Serial,
    /// Parallel loop over a dense integer range (one loop index).
    RangeFor,
    /// Parallel loop over mesh elements (one loop index).
    MeshFor,
    /// Parallel loop over the active cells of a storage-tree node.
    /// The number of loop indices is the domain node's active dimension
    /// count.
    StructFor {
        /// Storage-tree node defining the iteration domain.
        domain: StorageNodeId,
    },
}

/// A single statement in the kernel IR.
///
/// Matched exhaustively by analysis passes; [`StmtKind::Opaque`] is the
/// deliberate catch-all for everything those passes do not model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// Compile-time constant.
    Const {
        value: i64,
    },

    /// Unary operation.
    Unary {
        op: UnaryOp,
        operand: StmtId,
    },

    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: StmtId,
        rhs: StmtId,
    },

    /// The `index`-th loop index of the task boundary `task`.
    ///
    /// `task` may be an enclosing task boundary rather than the one whose
    /// body contains this statement; consumers must check.
    LoopIndex {
        task: StmtId,
        index: usize,
    },

    /// Upstream hint that `input`'s value is distinct on every iteration
    /// of the surrounding loop, with no particular dimension association.
    LoopUnique {
        input: StmtId,
    },

    /// Address computation into the storage tree: an ordered tuple of
    /// index values selecting one cell.
    ///
    /// `nodes` is a *set* of candidate storage-tree nodes — some packing
    /// schemes make a single access expression target several tree nodes
    /// at once.
    StorageAccess {
        nodes: SmallVec<[StorageNodeId; 2]>,
        indices: Vec<StmtId>,
    },

    /// Task boundary. `body` lists the statements of this task in
    /// production order; a nested task statement may appear in a body,
    /// but its own body statements do not (bodies are flat and disjoint).
    Task {
        kind: TaskKind,
        body: Vec<StmtId>,
    },

    /// Any statement kind the analysis passes do not model.
    Opaque,
}
