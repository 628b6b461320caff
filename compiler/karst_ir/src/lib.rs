//! Karst IR - Intermediate Representation Types
//!
//! This crate contains the data structures the Karst kernel compiler's
//! analysis and codegen passes operate on:
//!
//! - Statement kinds ([`StmtKind`]) and the statement arena ([`Kernel`])
//! - Task boundaries ([`TaskKind`]) delimiting scheduled parallel work
//! - The hierarchical storage tree ([`StorageTree`], [`StorageNode`])
//! - ID newtypes ([`StmtId`], [`StorageNodeId`]) for flat, index-based
//!   references between nodes
//!
//! # Design Philosophy
//!
//! - **Flatten everything**: no `Box<Stmt>` nesting; statements reference
//!   each other through `StmtId(u32)` indices into one arena.
//! - **Production order is topological order**: the arena is append-only
//!   and a statement's operands are always pushed before the statement
//!   itself, so a single forward scan visits every operand before its
//!   users. [`Kernel::validate`] checks this in debug builds.
//! - **Parent links, not ownership**: storage-tree nodes refer to their
//!   parent by [`StorageNodeId`]; the tree owns all nodes in one vector.

mod kernel;
mod stmt;
mod tree;

pub use kernel::Kernel;
pub use stmt::{BinaryOp, StmtId, StmtKind, TaskKind, UnaryOp};
pub use tree::{StorageNode, StorageNodeId, StorageTree};
