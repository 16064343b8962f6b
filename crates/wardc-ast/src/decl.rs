//! Declaration nodes (spec.md §3): "property, function, parameter, generic
//! parameter, struct, union, interface, union-type-case, union-alias-case,
//! type-extension, built-in-type, main-code".

use crate::attr::{Attribute, Modifier};
use crate::ids::{DeclContextId, DeclId, ExprId, SigId, StmtId};
use crate::ops::AssignKind;
use wardc_util::{Name, SourceRange};

#[derive(Clone, Debug)]
pub struct Decl {
    pub range: SourceRange,
    /// `None` only for [`DeclKind::MainCode`], which is unnamed.
    pub name: Option<Name>,
    pub modifiers: Vec<Modifier>,
    pub attrs: Vec<Attribute>,
    pub kind: DeclKind,
}

#[derive(Clone, Debug)]
pub enum DeclKind {
    /// `let x: T = init` / `let x := init` / `let x &- init`.
    ///
    /// Qualifier defaulting (spec.md §9 Open Question (b), fixed by
    /// SPEC_FULL.md §3): absent a `@cst`/`@mut` annotation on `qualified_sig`,
    /// the constraint generator defaults to `@cst` unless `init` binds via
    /// `move`/`alias` from an already-`@mut` source, in which case `@mut`.
    Property { qualified_sig: Option<SigId>, init: Option<(AssignKind, ExprId)> },

    Function {
        generic_params: Vec<DeclId>,
        params: Vec<DeclId>,
        codomain: Option<SigId>,
        /// `None` for an interface's unimplemented member signature.
        body: Option<StmtId>,
        /// Owns the scope holding `generic_params`, `params`, and any
        /// locals declared in `body` (spec.md §4.3: a function opens its
        /// own declaration context).
        context: DeclContextId,
    },

    Parameter { label: Option<Name>, sig: SigId },

    GenericParameter,

    Struct {
        generic_params: Vec<DeclId>,
        interfaces: Vec<SigId>,
        members: Vec<DeclId>,
        context: DeclContextId,
    },

    Union {
        generic_params: Vec<DeclId>,
        interfaces: Vec<SigId>,
        cases: Vec<DeclId>,
        members: Vec<DeclId>,
        context: DeclContextId,
    },

    Interface { generic_params: Vec<DeclId>, members: Vec<DeclId>, context: DeclContextId },

    /// `case some(T)` — a union case carrying payload types.
    UnionTypeCase { payload: Vec<SigId> },

    /// `case alias = SomeOtherType` — a union case that aliases an
    /// existing type rather than introducing a new tag.
    UnionAliasCase { aliased: SigId },

    TypeExtension { extended: SigId, interfaces: Vec<SigId>, members: Vec<DeclId>, context: DeclContextId },

    /// A primitive the type universe names but the AST does not define
    /// the body of (`Int`, `Bool`, ...); identity = this declaration.
    BuiltinType,

    /// The synthetic top-level "run this" declaration a module's loose
    /// statements are wrapped into (spec.md §3 node categories).
    MainCode { context: DeclContextId, body: StmtId },
}

impl Decl {
    /// The declaration context this node introduces for its own members,
    /// if any (spec.md §4.3: nominal-type bodies, functions and the
    /// synthetic main-code block each open a scope).
    pub fn own_context(&self) -> Option<DeclContextId> {
        match &self.kind {
            DeclKind::Function { context, .. }
            | DeclKind::Struct { context, .. }
            | DeclKind::Union { context, .. }
            | DeclKind::Interface { context, .. }
            | DeclKind::TypeExtension { context, .. }
            | DeclKind::MainCode { context, .. } => Some(*context),
            _ => None,
        }
    }

    /// Whether this declaration's kind may legally share a name with
    /// other declarations in the same scope (spec.md §4.3 step 2).
    /// Overloadability of *functions* specifically is additionally gated
    /// by the symbol's `overloadable` attribute set during binding; this
    /// is the syntactic ceiling on what binding will even consider.
    pub fn is_overloadable_kind(&self) -> bool {
        matches!(self.kind, DeclKind::Function { .. })
    }
}
