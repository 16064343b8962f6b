//! Expression nodes (spec.md §3): "null, lambda, unsafe-cast, infix,
//! prefix, call, call-argument, identifier, select, implicit-select,
//! array/set/map literals, scalar literals for bool/int/float/string,
//! paren, invalid".

use crate::ids::{DeclContextId, DeclId, ExprId, SigId, StmtId, SymbolId};
use smallvec::SmallVec;
use wardc_util::{Name, SourceRange};

#[derive(Clone, Debug)]
pub struct Expr {
    pub range: SourceRange,
    pub kind: ExprKind,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Null,

    /// `{ |params| body }` — a closure literal. Lowering (spec.md §4.6)
    /// extends its signature with captured free variables; the AST only
    /// records the surface params/body, capture analysis happens in
    /// `wardc-ir`.
    Lambda { params: Vec<DeclId>, body: StmtId, context: DeclContextId },

    /// `unsafe_cast(expr, T)` — spec.md §9: replaces the source's unsafe
    /// casts, kept explicit here rather than folded into a general cast
    /// so the solver can treat it specially (no conformance check).
    UnsafeCast { operand: ExprId, target: SigId },

    /// `lhs <op> rhs`, `op` naming the (possibly overloaded) operator
    /// function, e.g. `+`.
    Infix { op: Name, lhs: ExprId, rhs: ExprId },
    Prefix { op: Name, operand: ExprId },

    Call { callee: ExprId, args: Vec<ExprId> },
    /// One actual argument of a [`ExprKind::Call`] — its own node so a
    /// transformer can rewrite just the label or just the value.
    CallArgument { label: Option<Name>, value: ExprId },

    /// An identifier use. `candidates` is filled in by name binding
    /// (spec.md §4.3 step 3; empty until then) with every symbol visible
    /// under this name — exactly one remains "the" answer once the
    /// solver picks an overload (spec.md §3 invariant 4).
    Identifier { name: Name, candidates: SmallVec<[SymbolId; 1]> },

    /// `base.member`.
    Select { base: ExprId, member: Name },
    /// `.member` with an implicit base inferred from context (e.g. enum
    /// case shorthand).
    ImplicitSelect { member: Name },

    ArrayLiteral { elements: Vec<ExprId> },
    SetLiteral { elements: Vec<ExprId> },
    MapLiteral { entries: Vec<(ExprId, ExprId)> },

    BoolLiteral(bool),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),

    Paren(ExprId),

    Invalid,
}
