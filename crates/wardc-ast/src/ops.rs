//! Assignment flavors (spec.md §1: "three flavors of assignment (copy /
//! move / alias)"), shared between property initializers
//! ([`crate::decl::DeclKind::Property`]) and binding statements
//! ([`crate::stmt::StmtKind::Binding`]).

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignKind {
    /// `=` — target must be mutable (spec.md §4.4).
    Copy,
    /// `:=` — transfers ownership out of the source.
    Move,
    /// `&-` — aliases the source.
    Alias,
}
