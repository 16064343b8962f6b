//! Statement nodes (spec.md §3): "brace, if, while, binding, return,
//! invalid".

use crate::ids::{DeclContextId, ExprId, StmtId};
use crate::ops::AssignKind;
use wardc_util::SourceRange;

#[derive(Clone, Debug)]
pub struct Stmt {
    pub range: SourceRange,
    pub kind: StmtKind,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `{ ... }` — opens its own declaration context (spec.md §4.3) so
    /// `let` bindings inside a block are scoped to it.
    Brace { context: DeclContextId, stmts: Vec<StmtId> },
    If { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    While { cond: ExprId, body: StmtId },
    /// Reassignment of an already-bound lvalue: `x = 2`, `y := z`,
    /// `w &- source`. (Declaration *with* an initializer is
    /// [`crate::decl::DeclKind::Property`]; this node is for subsequent
    /// assignment.)
    Binding { lvalue: ExprId, op: AssignKind, rvalue: ExprId },
    Return { value: Option<ExprId> },
    Invalid,
}
