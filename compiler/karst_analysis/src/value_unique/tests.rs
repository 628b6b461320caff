use pretty_assertions::assert_eq;

use karst_ir::{BinaryOp, Kernel, StmtKind, StorageTree, TaskKind, UnaryOp};

use crate::test_helpers::{access, constant, domain, field, struct_for_2d};

use super::{LoopUniqueScanner, UniqueTag};

// ── Invariance propagation ──────────────────────────────

#[test]
fn constants_and_their_combinations_are_invariant() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, _i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let a = constant(&mut kernel, task, 1);
    let b = constant(&mut kernel, task, 2);
    let sum = kernel.push_in_task(
        task,
        StmtKind::Binary {
            op: BinaryOp::Mul,
            lhs: a,
            rhs: b,
        },
    );
    let neg = kernel.push_in_task(
        task,
        StmtKind::Unary {
            op: UnaryOp::Neg,
            operand: sum,
        },
    );
    kernel.validate();

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert!(scanner.is_loop_invariant(a));
    assert!(scanner.is_loop_invariant(b));
    assert!(scanner.is_loop_invariant(sum));
    assert!(scanner.is_loop_invariant(neg));
}

// ── Loop index tagging ──────────────────────────────────

#[test]
fn loop_indices_carry_their_dimension() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, j) = struct_for_2d(&mut kernel, &mut tree);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(i), Some(UniqueTag::Dim(0)));
    assert_eq!(scanner.unique_tag(j), Some(UniqueTag::Dim(1)));
}

#[test]
fn nested_task_index_is_not_tagged() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let dom = domain(&mut tree, 2);
    let outer = kernel.push_task(TaskKind::StructFor { domain: dom });
    let inner = kernel.push_in_task(
        outer,
        StmtKind::Task {
            kind: TaskKind::RangeFor,
            body: Vec::new(),
        },
    );
    // Index owned by the inner loop, produced in the outer body.
    let inner_index = kernel.push_in_task(outer, StmtKind::LoopIndex { task: inner, index: 0 });

    let scanner = LoopUniqueScanner::scan(&kernel, outer, 2);
    assert_eq!(scanner.unique_tag(inner_index), None);
    assert!(!scanner.is_loop_invariant(inner_index));
}

// ── Unique propagation through operators ────────────────

#[test]
fn negation_preserves_uniqueness() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let neg = kernel.push_in_task(
        task,
        StmtKind::Unary {
            op: UnaryOp::Neg,
            operand: i,
        },
    );

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(neg), Some(UniqueTag::Dim(0)));
}

#[test]
fn other_unary_operators_do_not_propagate() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let abs = kernel.push_in_task(
        task,
        StmtKind::Unary {
            op: UnaryOp::Abs,
            operand: i,
        },
    );

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(abs), None);
}

#[test]
fn injective_binary_with_invariant_preserves_tag_in_either_order() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let c = constant(&mut kernel, task, 4);

    let mut combine = |op, lhs, rhs| {
        kernel.push_in_task(task, StmtKind::Binary { op, lhs, rhs })
    };
    let add = combine(BinaryOp::Add, i, c);
    let sub = combine(BinaryOp::Sub, c, i);
    let xor = combine(BinaryOp::BitXor, i, c);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(add), Some(UniqueTag::Dim(0)));
    assert_eq!(scanner.unique_tag(sub), Some(UniqueTag::Dim(0)));
    assert_eq!(scanner.unique_tag(xor), Some(UniqueTag::Dim(0)));
}

#[test]
fn non_injective_binary_operators_do_not_propagate() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, j) = struct_for_2d(&mut kernel, &mut tree);
    let c = constant(&mut kernel, task, 4);

    let mut combine = |op, lhs, rhs| {
        kernel.push_in_task(task, StmtKind::Binary { op, lhs, rhs })
    };
    let mul = combine(BinaryOp::Mul, i, c);
    let min = combine(BinaryOp::Min, i, c);
    // Unique op unique: neither operand is invariant, nothing propagates.
    let both_unique = combine(BinaryOp::Add, i, j);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(mul), None);
    assert_eq!(scanner.unique_tag(min), None);
    assert_eq!(scanner.unique_tag(both_unique), None);
}

// ── Index tuple queries ─────────────────────────────────

#[test]
fn full_dimension_cover_is_loop_unique() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, j) = struct_for_2d(&mut kernel, &mut tree);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert!(scanner.is_index_tuple_loop_unique(&[i, j]));
    assert!(scanner.is_index_tuple_loop_unique(&[j, i]));
}

#[test]
fn access_query_reads_the_index_tuple() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, j) = struct_for_2d(&mut kernel, &mut tree);
    let x = field(&mut tree, None, false);
    let covering = access(&mut kernel, task, &[x], &[j, i]);
    let repeated = access(&mut kernel, task, &[x], &[i, i]);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert!(scanner.is_access_loop_unique(&kernel, covering));
    assert!(!scanner.is_access_loop_unique(&kernel, repeated));
}

#[test]
fn repeated_dimension_is_not_loop_unique() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let c = constant(&mut kernel, task, 0);

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    // a[i, i]: dimension 1 is unaccounted for.
    assert!(!scanner.is_index_tuple_loop_unique(&[i, i]));
    assert!(!scanner.is_index_tuple_loop_unique(&[i, c]));
}

#[test]
fn opaque_hint_short_circuits_the_dimension_check() {
    let mut kernel = Kernel::new();
    let mut tree = StorageTree::new();
    let (task, i, _j) = struct_for_2d(&mut kernel, &mut tree);
    let hint = kernel.push_in_task(task, StmtKind::LoopUnique { input: i });

    let scanner = LoopUniqueScanner::scan(&kernel, task, 2);
    assert_eq!(scanner.unique_tag(hint), Some(UniqueTag::Opaque));
    // One opaque index suffices, whatever the rest of the tuple is.
    assert!(scanner.is_index_tuple_loop_unique(&[hint, i]));
    assert!(scanner.is_index_tuple_loop_unique(&[hint]));
}
