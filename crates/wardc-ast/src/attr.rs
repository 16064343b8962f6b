//! Attributes and modifiers (spec.md §3): "first-class AST children,
//! comparable by (name, args) / by kind."

use crate::ids::ExprId;
use wardc_util::Name;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Name,
    pub args: Vec<ExprId>,
}

/// Declaration modifiers. `Mutating` and `Static` are named explicitly by
/// spec.md §3; `Overloadable` and the other symbol-attribute bits live on
/// [`crate::scope::Symbol`] instead since they describe binding behavior
/// rather than surface syntax, but a modifier can still request them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Mutating,
    Static,
}
