//! Typing constraints (spec.md §4.4): kinds, priorities and the
//! diagnostic location every constraint carries.
//!
//! Grounded on the teacher's `Constraint` enum in `faxc-sem/src/infer.rs`
//! (`Equal`/`SubType`/`Implements`), extended with the Construction,
//! Value/Type-member and Disjunction kinds and the anchor+path location
//! spec.md §4.4 asks for.

use smallvec::SmallVec;
use wardc_types::{PlaceholderKey, TypeId};
use wardc_util::{Name, SourceRange};

/// The AST node a constraint's location is anchored to. Opaque `u64` keys
/// (mirroring `wardc-types`' `NominalKey`/`PlaceholderKey`) since
/// `wardc-sem` is the first crate with both `wardc-ast` and `wardc-types`
/// in scope, but the constraint/solving code keeps the same
/// key-not-reference convention the lower crates established.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Decl(u64),
    Sig(u64),
    Stmt(u64),
    Expr(u64),
}

/// One step of a constraint's derivation path (spec.md §4.4's exact
/// list). Purely diagnostic: solving ignores the path except to extend it
/// on constraints it derives from another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DerivationStep {
    Annotation,
    BinaryOperator,
    BinaryRhs,
    Binding(PlaceholderKey),
    Call,
    Codomain,
    Condition,
    Identifier,
    Parameter(usize),
    Rvalue,
    Select,
}

/// An anchor node plus a non-empty derivation path (spec.md §4.4:
/// "a non-empty path of derivation steps").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub anchor: Anchor,
    pub range: SourceRange,
    pub path: SmallVec<[DerivationStep; 4]>,
}

impl Location {
    pub fn new(anchor: Anchor, range: SourceRange, step: DerivationStep) -> Self {
        Self { anchor, range, path: SmallVec::from_slice(&[step]) }
    }

    /// Location for a constraint the solver derives from unifying a
    /// composite type (e.g. one parameter of a function-type equality).
    /// Keeps the original anchor/range, extends the path.
    pub fn derive(&self, step: DerivationStep) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Self { anchor: self.anchor, range: self.range, path }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `T ≡ U`.
    Equality { lhs: TypeId, rhs: TypeId },
    /// `T ≤ U`.
    Conformance { lower: TypeId, upper: TypeId },
    /// `T <+ U` — `U` is the kind of nominal `N`, `T` one of `N`'s
    /// constructors.
    Construction { value: TypeId, kind_of: TypeId },
    /// `T.name ≡ U`.
    ValueMember { base: TypeId, name: Name, member_ty: TypeId },
    /// `T::name ≡ U`.
    TypeMember { base: TypeId, name: Name, member_ty: TypeId },
    /// One of several constraints must hold; each branch is tried in
    /// order, restoring `σ` between attempts (spec.md §4.5 step 3).
    Disjunction { branches: Vec<Constraint> },
}

impl ConstraintKind {
    /// Solving priority, higher fires first (spec.md §4.4 table).
    pub fn priority(&self) -> i32 {
        match self {
            ConstraintKind::Equality { .. } => 500,
            ConstraintKind::Conformance { .. } => 400,
            ConstraintKind::Construction { .. } => 300,
            ConstraintKind::ValueMember { .. } => 200,
            ConstraintKind::TypeMember { .. } => 200,
            ConstraintKind::Disjunction { .. } => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub location: Location,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn priority(&self) -> i32 {
        self.kind.priority()
    }
}
