//! Unique-access analysis for the Karst kernel compiler.
//!
//! Given the IR of one parallel-loop task, this crate decides, for every
//! storage-tree node touched inside the loop, whether all accesses to that
//! node within one iteration provably target a single,
//! iteration-distinguishable address. Downstream passes use the fact to
//! elide synchronization, privatize accumulators, and merge accesses to
//! packed sub-fields.
//!
//! Three analyzers, each consuming the previous one's output:
//!
//! - **[`value_unique`]** — classifies each value-producing statement of a
//!   task body as loop-invariant or loop-unique
//!   ([`LoopUniqueScanner`]).
//! - **[`access_unique`]** — decides per storage-tree node whether all
//!   accesses resolve to one loop-unique address
//!   ([`gather_uniquely_accessed_pointers`]).
//! - **[`bit_struct`]** — folds per-sub-field verdicts up to their
//!   containing physical storage unit, across every parallel task in the
//!   kernel ([`gather_uniquely_accessed_bit_structs`]).
//!
//! The analysis is read-only over the IR and rebuilds its maps on every
//! run; all IR well-formedness preconditions are fatal assertions (a
//! violation means an earlier compiler stage produced malformed IR).
//!
//! # Soundness direction
//!
//! Under-approximation is always safe: treating an access as "not unique"
//! only costs optimization. The analyzers therefore propagate uniqueness
//! through a deliberately small set of injective operators and classify
//! everything else conservatively. Falsely declaring uniqueness is the
//! only class of bug that matters.

pub mod access_unique;
pub mod bit_struct;
pub mod manager;
pub mod value_unique;

pub use access_unique::{gather_uniquely_accessed_pointers, UniqueAccessMap};
pub use bit_struct::{
    gather_uniquely_accessed_bit_structs, BitStructVerdicts, GatherUniquelyAccessedBitStructsPass,
};
pub use manager::{AnalysisManager, Pass};
pub use value_unique::{LoopUniqueScanner, UniqueTag};

use karst_ir::StmtId;

/// External equality oracles consumed as black boxes.
///
/// Both predicates must only answer `true` when the property provably
/// holds on every loop iteration; answering `false` is always sound.
pub trait UniquenessOracle {
    /// Do `a` and `b` denote the same physical address on every
    /// iteration?
    fn definitely_same_address(&self, a: StmtId, b: StmtId) -> bool;

    /// Do `a` and `b` evaluate to the same value on every iteration?
    fn same_value(&self, a: StmtId, b: StmtId) -> bool;
}

/// Maximally conservative oracle: two statements are only equal when they
/// are the same statement.
///
/// Useful as a default when no value-numbering information is available;
/// identical statement IDs trivially satisfy both predicates.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityOracle;

impl UniquenessOracle for IdentityOracle {
    fn definitely_same_address(&self, a: StmtId, b: StmtId) -> bool {
        a == b
    }

    fn same_value(&self, a: StmtId, b: StmtId) -> bool {
        a == b
    }
}

#[cfg(test)]
mod test_helpers;
