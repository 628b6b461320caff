//! The statement arena for one compiled kernel.

use crate::stmt::{StmtId, StmtKind, TaskKind};

/// One compiled kernel: an append-only statement arena plus the list of
/// top-level task boundaries, in scheduling order.
///
/// A task boundary is created first (with an empty body) and its body
/// statements are appended afterwards with [`Kernel::push_in_task`], so a
/// loop-index statement can name its owning task by ID.
///
/// # Order invariant
///
/// Statement production order is a valid topological order of the
/// expression DAG: every operand ID is strictly smaller than the ID of the
/// statement using it. The analysis passes rely on this to classify every
/// statement in a single forward scan. [`Kernel::validate`] asserts the
/// invariant in debug builds.
#[derive(Clone, Debug, Default)]
pub struct Kernel {
    stmts: Vec<StmtKind>,
    tasks: Vec<StmtId>,
}

impl Kernel {
    /// Create an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement and return its ID.
    #[expect(clippy::cast_possible_truncation, reason = "statement counts fit u32")]
    pub fn push(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(kind);
        id
    }

    /// Append an empty task-boundary statement and register it as a
    /// top-level task. Body statements are added with
    /// [`Kernel::push_in_task`].
    pub fn push_task(&mut self, kind: TaskKind) -> StmtId {
        let id = self.push(StmtKind::Task { kind, body: Vec::new() });
        self.tasks.push(id);
        id
    }

    /// Append a statement and record it in the body of `task`.
    ///
    /// Panics if `task` is not a task-boundary statement.
    pub fn push_in_task(&mut self, task: StmtId, kind: StmtKind) -> StmtId {
        let id = self.push(kind);
        match &mut self.stmts[task.index()] {
            StmtKind::Task { body, .. } => body.push(id),
            other => panic!("statement {} is not a task boundary: {other:?}", task.raw()),
        }
        id
    }

    /// Look up a statement.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &StmtKind {
        &self.stmts[id.index()]
    }

    /// Top-level task boundaries in scheduling order.
    pub fn tasks(&self) -> &[StmtId] {
        &self.tasks
    }

    /// The kind of the task boundary `task`.
    ///
    /// Panics if `task` is not a task-boundary statement.
    pub fn task_kind(&self, task: StmtId) -> TaskKind {
        match self.stmt(task) {
            StmtKind::Task { kind, .. } => *kind,
            other => panic!("statement {} is not a task boundary: {other:?}", task.raw()),
        }
    }

    /// The body of the task boundary `task`, in production order.
    ///
    /// Bodies are flat: a nested task boundary appears as a single entry
    /// and its own body statements are not included.
    ///
    /// Panics if `task` is not a task-boundary statement.
    pub fn task_body(&self, task: StmtId) -> &[StmtId] {
        match self.stmt(task) {
            StmtKind::Task { body, .. } => body,
            other => panic!("statement {} is not a task boundary: {other:?}", task.raw()),
        }
    }

    /// Number of statements in the arena.
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Assert structural well-formedness (debug builds only):
    ///
    /// - every operand ID is strictly smaller than the ID of its user
    ///   (topological production order)
    /// - task bodies reference existing statements in strictly increasing
    ///   order, each produced after the task statement itself
    ///
    /// Catches bugs in upstream lowering before analysis consumes the IR.
    pub fn validate(&self) {
        for (i, kind) in self.stmts.iter().enumerate() {
            let check = |operand: StmtId| {
                debug_assert!(
                    operand.index() < i,
                    "statement {i} uses operand {} that does not precede it",
                    operand.raw(),
                );
            };
            match kind {
                StmtKind::Const { .. } | StmtKind::Opaque => {}
                StmtKind::Unary { operand, .. } => check(*operand),
                StmtKind::Binary { lhs, rhs, .. } => {
                    check(*lhs);
                    check(*rhs);
                }
                // A loop index names its owning task, which precedes it.
                StmtKind::LoopIndex { task, .. } => {
                    debug_assert!(
                        matches!(
                            self.stmts.get(task.index()),
                            Some(StmtKind::Task { .. })
                        ),
                        "loop index statement {i} names {} which is not a task boundary",
                        task.raw(),
                    );
                }
                StmtKind::LoopUnique { input } => check(*input),
                StmtKind::StorageAccess { indices, .. } => {
                    for &index in indices {
                        check(index);
                    }
                }
                StmtKind::Task { body, .. } => {
                    let mut previous = None;
                    for &stmt in body {
                        debug_assert!(
                            stmt.index() > i && stmt.index() < self.stmts.len(),
                            "task {i} body references statement {} outside the task",
                            stmt.raw(),
                        );
                        if let Some(previous) = previous {
                            debug_assert!(
                                previous < stmt,
                                "task {i} body is not in production order",
                            );
                        }
                        previous = Some(stmt);
                    }
                }
            }
        }
    }
}
