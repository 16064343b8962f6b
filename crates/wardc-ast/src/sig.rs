//! Type signature nodes (spec.md §3: "type signatures (qualified,
//! identifier, nested, implicit-nested, function, parameter, invalid)").
//!
//! A signature is surface syntax that *names* a type; `wardc-sem`'s
//! constraint generator turns each one into an actual [`wardc_types::TypeId`]
//! (building placeholders, nominals, etc. along the way). The signature
//! tree itself carries no resolved type.

use crate::ids::{DeclId, SigId, SymbolId};
use smallvec::SmallVec;
use wardc_types::QualifierSet;
use wardc_util::{Name, SourceRange};

#[derive(Clone, Debug)]
pub struct Sig {
    pub range: SourceRange,
    pub kind: SigKind,
}

/// One parameter slot in a function-type signature (spec.md §3 "function,
/// parameter" signature kinds).
#[derive(Clone, Debug)]
pub struct ParameterSig {
    pub range: SourceRange,
    pub label: Option<Name>,
    pub sig: SigId,
}

#[derive(Clone, Debug)]
pub enum SigKind {
    /// `@cst T` / `@mut T` — spec.md §3 qualifier-annotated signature.
    Qualified { qualifiers: QualifierSet, inner: SigId },
    /// A bare name, optionally generic-applied: `Foo`, `Box<Int>`.
    ///
    /// `candidates` mirrors `ExprKind::Identifier`'s: empty until name
    /// binding runs, then filled with every symbol visible under `name`;
    /// exactly one remains "the" answer once a type-member constraint picks
    /// it during solving.
    Identifier { name: Name, generic_args: Vec<SigId>, candidates: SmallVec<[SymbolId; 1]> },
    /// `Base::Member<Args>` — a member of another signature, e.g. a union
    /// case used as a type, or an associated type.
    Nested { base: SigId, member: Name, generic_args: Vec<SigId> },
    /// `.Member` — nested with an implicit base inferred from context
    /// (the enclosing union/interface).
    ImplicitNested { member: Name },
    /// `(A, B) -> C`.
    Function { generic_params: Vec<DeclId>, params: Vec<ParameterSig>, codomain: SigId },
    /// One parameter slot, reachable as its own node so a transformer can
    /// replace just the label or just the inner signature.
    Parameter(ParameterSig),
    /// Recovery marker for a signature the parser (external) could not
    /// make sense of.
    Invalid,
}
