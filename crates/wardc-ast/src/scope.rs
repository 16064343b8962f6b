//! Declaration contexts, scopes and symbols (spec.md §3).
//!
//! Two distinct trees coexist over the same AST, per spec.md §4.3:
//!
//! - [`DeclContext`] is built by the parser (external) directly from
//!   nesting: every declaration that opens a body (function, struct,
//!   union, interface, type-extension, main-code) owns one.
//! - [`Scope`] is built *by* name binding (`wardc-sem`), one per
//!   declaration context, and is where symbols actually get inserted and
//!   resolved. Keeping them separate lets the AST exist (and be
//!   traversed/transformed) before binding has run.
//!
//! Both are non-owning trees over an arena, per spec.md §9's "arena +
//! index" design note: parent links are plain (non-`Option`-wrapped-Rc)
//! ids, giving O(1) upward traversal with no weak-reference bookkeeping.

use crate::ids::{DeclContextId, DeclId, ScopeId, SymbolId};
use indexmap::IndexMap;
use smallvec::SmallVec;
use wardc_types::QualifiedType;
use wardc_util::Name;

/// A node in the parser-built declaration-context tree (spec.md §3).
#[derive(Clone, Debug, Default)]
pub struct DeclContext {
    pub parent: Option<DeclContextId>,
    pub declarations: Vec<DeclId>,
}

/// A node in the binder-built scope tree. One-to-one with a
/// [`DeclContext`] once binding has processed it.
#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub decl_context: Option<DeclContextId>,
    table: IndexMap<Name, SmallVec<[SymbolId; 2]>>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, decl_context: DeclContextId) -> Self {
        Self { parent, decl_context: Some(decl_context), table: IndexMap::new() }
    }

    pub fn insert(&mut self, name: Name, symbol: SymbolId) {
        self.table.entry(name).or_default().push(symbol);
    }

    pub fn lookup_local(&self, name: Name) -> &[SymbolId] {
        self.table.get(&name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.table.keys().copied()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolAttrs {
    pub overloadable: bool,
    pub reassignable: bool,
    pub is_static: bool,
    pub method: bool,
}

/// `(name, scope, type, attribute set)` — spec.md §3 "Symbol".
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    pub scope: ScopeId,
    pub ty: QualifiedType,
    pub attrs: SymbolAttrs,
    pub decl: DeclId,
}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.scope.hash(state);
    }
}

/// Owns every [`DeclContext`] and [`Scope`] for one module.
#[derive(Default)]
pub struct ContextTree {
    pub contexts: wardc_util::IndexVec<DeclContextId, DeclContext>,
    pub scopes: wardc_util::IndexVec<ScopeId, Scope>,
}

impl ContextTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_context(&mut self, parent: Option<DeclContextId>) -> DeclContextId {
        self.contexts.push(DeclContext { parent, declarations: Vec::new() })
    }

    /// Transitive closure of parent-reachability (spec.md §3
    /// "is-enclosed-in").
    pub fn is_enclosed_in(&self, inner: DeclContextId, outer: DeclContextId) -> bool {
        let mut cur = Some(inner);
        while let Some(id) = cur {
            if id == outer {
                return true;
            }
            cur = self.contexts[id].parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_root_context_has_no_parent() {
        let mut tree = ContextTree::new();
        let root = tree.new_context(None);
        assert!(tree.contexts[root].parent.is_none());
    }

    #[test]
    fn is_enclosed_in_is_transitive() {
        let mut tree = ContextTree::new();
        let root = tree.new_context(None);
        let child = tree.new_context(Some(root));
        let grandchild = tree.new_context(Some(child));
        assert!(tree.is_enclosed_in(grandchild, root));
        assert!(!tree.is_enclosed_in(root, grandchild));
    }
}
