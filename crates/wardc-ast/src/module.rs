//! [`Module`] — the arena that owns every node, context, scope and symbol
//! belonging to one compilation unit (spec.md §3 "Lifecycle": "AST nodes
//! are created by the parser and live for the module's lifetime").

use crate::decl::Decl;
use crate::expr::Expr;
use crate::ids::{DeclContextId, DeclId, ExprId, ModuleId, ScopeId, SigId, StmtId, SymbolId};
use crate::scope::{ContextTree, Scope, Symbol};
use crate::sig::Sig;
use crate::stmt::Stmt;
use wardc_util::{IndexVec, IssueSet, Name};

pub struct Module {
    pub id: ModuleId,
    pub name: Name,

    decls: IndexVec<DeclId, Decl>,
    sigs: IndexVec<SigId, Sig>,
    stmts: IndexVec<StmtId, Stmt>,
    exprs: IndexVec<ExprId, Expr>,
    symbols: IndexVec<SymbolId, Symbol>,

    pub contexts: ContextTree,
    /// The module's own declaration context. Has no parent (spec.md §3
    /// invariant 6).
    pub root_context: DeclContextId,

    /// Top-level declarations, in source order.
    pub declarations: Vec<DeclId>,

    pub issues: IssueSet,
}

impl Module {
    pub fn new(id: ModuleId, name: Name) -> Self {
        let mut contexts = ContextTree::new();
        let root_context = contexts.new_context(None);
        Self {
            id,
            name,
            decls: IndexVec::new(),
            sigs: IndexVec::new(),
            stmts: IndexVec::new(),
            exprs: IndexVec::new(),
            symbols: IndexVec::new(),
            contexts,
            root_context,
            declarations: Vec::new(),
            issues: IssueSet::new(),
        }
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl)
    }
    pub fn alloc_sig(&mut self, sig: Sig) -> SigId {
        self.sigs.push(sig)
    }
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.push(stmt)
    }
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr)
    }
    pub fn alloc_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol)
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id]
    }
    pub fn sig(&self, id: SigId) -> &Sig {
        &self.sigs[id]
    }
    pub fn sig_mut(&mut self, id: SigId) -> &mut Sig {
        &mut self.sigs[id]
    }
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }
    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id]
    }
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id]
    }
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> {
        self.decls.indices()
    }
    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> {
        self.exprs.indices()
    }
    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> {
        self.symbols.indices()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.contexts.scopes[id]
    }
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.contexts.scopes[id]
    }

    /// Register a top-level declaration, linking it into the module's
    /// root declaration context.
    pub fn add_top_level(&mut self, decl: DeclId) {
        self.declarations.push(decl);
        self.contexts.contexts[self.root_context].declarations.push(decl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::DeclKind;
    use wardc_util::{Interner, SourceRange};

    #[test]
    fn fresh_module_root_context_has_no_parent() {
        let mut interner = Interner::new();
        let name = interner.intern("main");
        let module = Module::new(ModuleId(0), name);
        assert!(module.contexts.contexts[module.root_context].parent.is_none());
    }

    #[test]
    fn add_top_level_links_into_root_context() {
        let mut interner = Interner::new();
        let mod_name = interner.intern("main");
        let mut module = Module::new(ModuleId(0), mod_name);
        let builtin_name = interner.intern("Int");
        let decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(builtin_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::BuiltinType,
        });
        module.add_top_level(decl);
        assert_eq!(module.contexts.contexts[module.root_context].declarations, vec![decl]);
    }
}
