//! Name binding: builds the scope tree over a module's declaration
//! contexts and resolves every identifier to the symbols visible at its
//! use site.
//!
//! Grounded on the teacher's rib-chain resolver (`faxc-sem/src/scope.rs`'s
//! `ScopeTree::resolve`, walking `Rib::parent` until a binding is found),
//! generalized from one flat scope stack to the per-declaration-context
//! tree `wardc-ast` carries and extended with overload-aware insertion.
//!
//! Implemented as a single top-down walk rather than two passes over a
//! pre-built context tree: every node that opens a context (function,
//! struct/union/interface body, type extension, main-code, brace block,
//! lambda) pushes a fresh scope as the walk reaches it, inserts that
//! scope's symbols, then recurses with the new scope in scope (so-to-speak)
//! for its children. This gives the pre-order guarantee directly from
//! recursion order: an outer scope is always fully populated with its own
//! symbols before any inner scope is built, so forward references inside a
//! nominal type's body see every sibling member.

use smallvec::SmallVec;
use wardc_ast::{
    DeclId, ExprId, ExprKind, Module, ScopeId, Scope, Sig, SigKind, SigId, StmtId, StmtKind, Symbol, SymbolAttrs, SymbolId,
};
use wardc_types::{QualifiedType, TypeContext};
use wardc_util::{Issue, Name};

pub fn bind_module(module: &mut Module, types: &mut TypeContext) {
    let mut binder = Binder { module, types };
    let root_scope = binder.new_scope(binder.module.root_context, None);
    let top_level = binder.module.declarations.clone();
    binder.insert_all(root_scope, &top_level);
    for decl_id in top_level {
        binder.bind_decl(decl_id, root_scope);
    }
}

struct Binder<'m, 't> {
    module: &'m mut Module,
    types: &'t mut TypeContext,
}

impl<'m, 't> Binder<'m, 't> {
    fn new_scope(&mut self, context: wardc_ast::DeclContextId, parent: Option<ScopeId>) -> ScopeId {
        let scopes = &mut self.module.contexts.scopes;
        scopes.push(Scope::new(parent, context))
    }

    fn insert_all(&mut self, scope: ScopeId, decls: &[DeclId]) {
        for decl_id in decls {
            self.insert_symbol(scope, *decl_id);
        }
    }

    /// Insert one declaration's symbol under its name. Multiple entries
    /// under the same name are allowed only if every existing entry (and
    /// the new one) is overloadable; otherwise emits `duplicate
    /// declaration` and drops the later entry.
    fn insert_symbol(&mut self, scope: ScopeId, decl_id: DeclId) {
        let decl = self.module.decl(decl_id);
        let Some(name) = decl.name else { return };
        let range = decl.range;
        let overloadable = decl.is_overloadable_kind();
        let is_static = decl.modifiers.iter().any(|m| matches!(m, wardc_ast::Modifier::Static));
        let existing: SmallVec<[SymbolId; 2]> = self.module.scope(scope).lookup_local(name).into();

        if !existing.is_empty() {
            let all_overloadable =
                overloadable && existing.iter().all(|s| self.module.symbol(*s).attrs.overloadable);
            if !all_overloadable {
                self.module
                    .issues
                    .push(Issue::error("duplicate declaration", range).with_anchor(decl_id.0 as u64));
                return;
            }
        }

        let ty_var = self.types.get_type_var();
        let symbol_id = self.module.alloc_symbol(Symbol {
            name,
            scope,
            ty: QualifiedType::unresolved(ty_var),
            attrs: SymbolAttrs { overloadable, reassignable: !overloadable, is_static, method: false },
            decl: decl_id,
        });
        self.module.scope_mut(scope).insert(name, symbol_id);
    }

    fn resolve_name(&self, scope: ScopeId, name: Name) -> SmallVec<[SymbolId; 1]> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let found = self.module.scope(id).lookup_local(name);
            if !found.is_empty() {
                return found.iter().copied().collect();
            }
            cur = self.module.scope(id).parent;
        }
        SmallVec::new()
    }

    fn bind_decl(&mut self, decl_id: DeclId, scope: ScopeId) {
        use wardc_ast::DeclKind::*;
        let kind = self.module.decl(decl_id).kind.clone();
        match kind {
            Property { qualified_sig, init } => {
                if let Some(sig) = qualified_sig {
                    self.bind_sig(sig, scope);
                }
                if let Some((_, expr)) = init {
                    self.bind_expr(expr, scope);
                }
            }
            Function { generic_params, params, codomain, body, context } => {
                let inner = self.new_scope(context, Some(scope));
                let mut decls = generic_params;
                decls.extend(params);
                self.insert_all(inner, &decls);
                for p in decls {
                    self.bind_decl(p, inner);
                }
                if let Some(sig) = codomain {
                    self.bind_sig(sig, inner);
                }
                if let Some(body) = body {
                    self.bind_stmt(body, inner);
                }
            }
            Parameter { sig, .. } => self.bind_sig(sig, scope),
            GenericParameter => {}
            Struct { generic_params, interfaces, members, context } => {
                let inner = self.new_scope(context, Some(scope));
                let mut decls = generic_params;
                decls.extend(members);
                self.insert_all(inner, &decls);
                for s in interfaces {
                    self.bind_sig(s, scope);
                }
                for m in decls {
                    self.bind_decl(m, inner);
                }
            }
            Union { generic_params, interfaces, cases, members, context } => {
                let inner = self.new_scope(context, Some(scope));
                let mut decls = generic_params;
                decls.extend(cases.clone());
                decls.extend(members.clone());
                self.insert_all(inner, &decls);
                for s in interfaces {
                    self.bind_sig(s, scope);
                }
                for c in cases {
                    self.bind_decl(c, inner);
                }
                for m in members {
                    self.bind_decl(m, inner);
                }
            }
            Interface { generic_params, members, context } => {
                let inner = self.new_scope(context, Some(scope));
                let mut decls = generic_params;
                decls.extend(members.clone());
                self.insert_all(inner, &decls);
                for m in members {
                    self.bind_decl(m, inner);
                }
            }
            UnionTypeCase { payload } => {
                for s in payload {
                    self.bind_sig(s, scope);
                }
            }
            UnionAliasCase { aliased } => self.bind_sig(aliased, scope),
            TypeExtension { extended, interfaces, members, context } => {
                self.bind_sig(extended, scope);
                for s in interfaces.clone() {
                    self.bind_sig(s, scope);
                }
                let inner = self.new_scope(context, Some(scope));
                self.insert_all(inner, &members);
                for m in members {
                    self.bind_decl(m, inner);
                }
            }
            BuiltinType => {}
            MainCode { context, body } => {
                let inner = self.new_scope(context, Some(scope));
                self.bind_stmt(body, inner);
            }
        }
    }

    fn bind_sig(&mut self, sig_id: SigId, scope: ScopeId) {
        let kind = self.module.sig(sig_id).kind.clone();
        match kind {
            SigKind::Qualified { inner, .. } => self.bind_sig(inner, scope),
            SigKind::Identifier { name, generic_args, .. } => {
                let candidates = self.resolve_name(scope, name);
                if candidates.is_empty() {
                    let range = self.module.sig(sig_id).range;
                    self.module.issues.push(Issue::error("undefined symbol", range).with_anchor(sig_id.0 as u64));
                }
                if let SigKind::Identifier { candidates: c, .. } = &mut self.module.sig_mut(sig_id).kind {
                    *c = candidates;
                }
                for s in generic_args {
                    self.bind_sig(s, scope);
                }
            }
            SigKind::Nested { base, generic_args, .. } => {
                self.bind_sig(base, scope);
                for s in generic_args {
                    self.bind_sig(s, scope);
                }
            }
            SigKind::ImplicitNested { .. } | SigKind::Invalid => {}
            SigKind::Function { generic_params, params, codomain } => {
                for p in &generic_params {
                    self.bind_decl(*p, scope);
                }
                for p in params {
                    self.bind_sig(p.sig, scope);
                }
                self.bind_sig(codomain, scope);
            }
            SigKind::Parameter(p) => self.bind_sig(p.sig, scope),
        }
    }

    fn bind_expr(&mut self, expr_id: ExprId, scope: ScopeId) {
        let kind = self.module.expr(expr_id).kind.clone();
        match kind {
            ExprKind::Identifier { name, .. } => {
                let candidates = self.resolve_name(scope, name);
                if candidates.is_empty() {
                    let range = self.module.expr(expr_id).range;
                    self.module.issues.push(Issue::error("undefined symbol", range).with_anchor(expr_id.0 as u64));
                }
                if let ExprKind::Identifier { candidates: c, .. } = &mut self.module.expr_mut(expr_id).kind {
                    *c = candidates;
                }
            }
            ExprKind::Lambda { params, body, context } => {
                let inner = self.new_scope(context, Some(scope));
                self.insert_all(inner, &params);
                for p in params {
                    self.bind_decl(p, inner);
                }
                self.bind_stmt(body, inner);
            }
            ExprKind::UnsafeCast { operand, target } => {
                self.bind_expr(operand, scope);
                self.bind_sig(target, scope);
            }
            ExprKind::Infix { lhs, rhs, .. } => {
                self.bind_expr(lhs, scope);
                self.bind_expr(rhs, scope);
            }
            ExprKind::Prefix { operand, .. } => self.bind_expr(operand, scope),
            ExprKind::Call { callee, args } => {
                self.bind_expr(callee, scope);
                for a in args {
                    self.bind_expr(a, scope);
                }
            }
            ExprKind::CallArgument { value, .. } => self.bind_expr(value, scope),
            ExprKind::Select { base, .. } => self.bind_expr(base, scope),
            ExprKind::ArrayLiteral { elements } | ExprKind::SetLiteral { elements } => {
                for e in elements {
                    self.bind_expr(e, scope);
                }
            }
            ExprKind::MapLiteral { entries } => {
                for (k, v) in entries {
                    self.bind_expr(k, scope);
                    self.bind_expr(v, scope);
                }
            }
            ExprKind::Paren(inner) => self.bind_expr(inner, scope),
            ExprKind::Null
            | ExprKind::ImplicitSelect { .. }
            | ExprKind::BoolLiteral(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::Invalid => {}
        }
    }

    fn bind_stmt(&mut self, stmt_id: StmtId, scope: ScopeId) {
        let kind = self.module.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Brace { context, stmts } => {
                let inner = self.new_scope(context, Some(scope));
                let locals = self.module.contexts.contexts[context].declarations.clone();
                self.insert_all(inner, &locals);
                for d in locals {
                    self.bind_decl(d, inner);
                }
                for s in stmts {
                    self.bind_stmt(s, inner);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.bind_expr(cond, scope);
                self.bind_stmt(then_branch, scope);
                if let Some(e) = else_branch {
                    self.bind_stmt(e, scope);
                }
            }
            StmtKind::While { cond, body } => {
                self.bind_expr(cond, scope);
                self.bind_stmt(body, scope);
            }
            StmtKind::Binding { lvalue, rvalue, .. } => {
                self.bind_expr(lvalue, scope);
                self.bind_expr(rvalue, scope);
            }
            StmtKind::Return { value } => {
                if let Some(e) = value {
                    self.bind_expr(e, scope);
                }
            }
            StmtKind::Invalid => {}
        }
    }
}

#[allow(dead_code)]
fn touch_sig_type(_: &Sig) {}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_ast::{Decl, DeclKind, Expr, ModuleId};
    use wardc_util::{Interner, SourceRange};

    #[test]
    fn single_let_binds_to_an_int_literal() {
        let mut interner = Interner::new();
        let mut types = TypeContext::new();
        let mod_name = interner.intern("m");
        let x_name = interner.intern("x");
        let mut module = Module::new(ModuleId(0), mod_name);

        let one = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(1) });
        let prop = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Property { qualified_sig: None, init: Some((wardc_ast::AssignKind::Copy, one)) },
        });
        module.add_top_level(prop);

        bind_module(&mut module, &mut types);

        assert!(module.issues.in_display_order().is_empty());
        // bind_module pushes the root scope first, so it is always index 0.
        let root_scope = module.scope(wardc_ast::ScopeId(0));
        assert_eq!(root_scope.lookup_local(x_name).len(), 1);
    }

    #[test]
    fn undefined_identifier_records_error_and_empty_candidates() {
        let mut interner = Interner::new();
        let mut types = TypeContext::new();
        let mod_name = interner.intern("m");
        let missing_name = interner.intern("missing");
        let mut module = Module::new(ModuleId(0), mod_name);

        let id_expr = module.alloc_expr(Expr {
            range: SourceRange::synthetic(),
            kind: ExprKind::Identifier { name: missing_name, candidates: SmallVec::new() },
        });
        let main_ctx = module.contexts.new_context(Some(module.root_context));
        let ret = module.alloc_stmt(wardc_ast::Stmt { range: SourceRange::synthetic(), kind: StmtKind::Return { value: Some(id_expr) } });
        let main = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: None,
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::MainCode { context: main_ctx, body: ret },
        });
        module.add_top_level(main);

        bind_module(&mut module, &mut types);

        assert_eq!(module.issues.in_display_order().len(), 1);
        match &module.expr(id_expr).kind {
            ExprKind::Identifier { candidates, .. } => assert!(candidates.is_empty()),
            _ => panic!("expected identifier"),
        }
    }
}
