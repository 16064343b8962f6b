//! Constraint generation (spec.md §4.4): walks a bound module and attaches
//! one or more typing constraints to every typed node.
//!
//! Written as a hand-rolled recursive walk in `bind.rs`'s style rather than
//! through the `Visitor` trait: like binding, generation needs to thread
//! extra state (the enclosing function's codomain, for `return`) through
//! the descent, and needs to visit declarations and signatures the
//! default visitor order would interleave with statements in ways that
//! don't match the constraint derivation spec.md §4.4 describes per node
//! kind.
//!
//! Every expression gets a fresh type variable up front (`expr_var`,
//! memoized in `expr_types`); constraints then equate that variable to
//! whatever the node's shape demands. This is what lets an identifier's
//! disjunction and a call's equality both mention "the callee's type"
//! without either one computing it first.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::HashSet;
use wardc_ast::{AssignKind, DeclId, ExprId, ExprKind, Module, StmtId, StmtKind, SymbolId};
use wardc_types::{open_tracked, FunctionParam, QualifiedType, TypeContext, TypeId, TypeVarId};
use wardc_util::Name;

use crate::constraint::{Anchor, Constraint, ConstraintKind, DerivationStep, Location};
use crate::registry::TypeRegistry;

pub struct GeneratedConstraints {
    pub constraints: Vec<Constraint>,
    /// The type variable standing for each expression node's type, before
    /// solving (spec.md §3 invariant 3: "every expression node has exactly
    /// one type after inference").
    pub expr_types: FxHashMap<ExprId, TypeId>,
    /// The resolved qualifier for every property declaration, whether it
    /// came from an explicit `@cst`/`@mut` annotation or from defaulting
    /// (spec.md §9 Open Question (b)): `@cst` unless bound via move/alias
    /// from an already-`@mut` source, in which case `@mut`.
    pub property_qualifiers: FxHashMap<DeclId, wardc_types::QualifierSet>,
    /// Every type variable minted by opening a generic declaration at a
    /// use site. A variable in this set stands for a placeholder that may
    /// occur more than once in one signature (the non-linear case of
    /// scenario 4 in the pipeline's testable-properties notes); the
    /// solver only allows a join-to-`Anything` fallback for variables in
    /// this set, never for an ordinary expression type variable.
    pub opened_vars: HashSet<TypeVarId>,
}

pub fn generate_module(
    module: &Module,
    types: &mut TypeContext,
    registry: &mut TypeRegistry,
) -> GeneratedConstraints {
    let symbol_by_decl: FxHashMap<DeclId, SymbolId> =
        module.symbol_ids().map(|s| (module.symbol(s).decl, s)).collect();
    let mut gen = Generator {
        module,
        types,
        registry,
        symbol_by_decl,
        expr_types: FxHashMap::default(),
        visited_exprs: Default::default(),
        property_qualifiers: Default::default(),
        opened_vars: HashSet::default(),
        constraints: Vec::new(),
    };
    for decl_id in module.declarations.clone() {
        gen.generate_decl(decl_id, None);
    }
    GeneratedConstraints {
        constraints: gen.constraints,
        expr_types: gen.expr_types,
        property_qualifiers: gen.property_qualifiers,
        opened_vars: gen.opened_vars,
    }
}

struct Generator<'m, 't, 'r> {
    module: &'m Module,
    types: &'t mut TypeContext,
    registry: &'r mut TypeRegistry,
    symbol_by_decl: FxHashMap<DeclId, SymbolId>,
    expr_types: FxHashMap<ExprId, TypeId>,
    visited_exprs: rustc_hash::FxHashSet<ExprId>,
    /// Resolved qualifier per property declaration (see
    /// `resolve_property_qualifier`); `solve.rs` folds these into the
    /// symbol table alongside the solved bare type.
    property_qualifiers: FxHashMap<DeclId, wardc_types::QualifierSet>,
    opened_vars: HashSet<TypeVarId>,
    constraints: Vec<Constraint>,
}

impl<'m, 't, 'r> Generator<'m, 't, 'r> {
    fn expr_var(&mut self, expr_id: ExprId) -> TypeId {
        if let Some(&ty) = self.expr_types.get(&expr_id) {
            return ty;
        }
        let ty = self.types.get_type_var();
        self.expr_types.insert(expr_id, ty);
        ty
    }

    fn symbol_var(&self, decl_id: DeclId) -> Option<TypeId> {
        let symbol_id = *self.symbol_by_decl.get(&decl_id)?;
        Some(self.module.symbol(symbol_id).ty.base)
    }

    fn push(&mut self, kind: ConstraintKind, location: Location) {
        self.constraints.push(Constraint::new(kind, location));
    }

    fn equality(&mut self, lhs: TypeId, rhs: TypeId, anchor: Anchor, range: wardc_util::SourceRange, step: DerivationStep) {
        self.push(ConstraintKind::Equality { lhs, rhs }, Location::new(anchor, range, step));
    }

    fn generate_decl(&mut self, decl_id: DeclId, return_ty: Option<TypeId>) {
        use wardc_ast::DeclKind::*;
        let range = self.module.decl(decl_id).range;
        let anchor = Anchor::Decl(decl_id.as_key());
        let kind = self.module.decl(decl_id).kind.clone();
        match kind {
            Property { qualified_sig, init } => {
                let Some(sym_ty) = self.symbol_var(decl_id) else { return };
                if let Some(sig) = qualified_sig {
                    let annotated = self.registry.sig_to_type(self.module, self.types, sig);
                    self.equality(sym_ty, annotated, anchor, range, DerivationStep::Annotation);
                }
                if let Some((_op, expr)) = init {
                    self.generate_expr(expr);
                    let rhs_ty = self.expr_var(expr);
                    self.equality(sym_ty, rhs_ty, anchor, range, DerivationStep::Rvalue);
                }
                self.resolve_property_qualifier(decl_id);
            }
            Function { generic_params, params, codomain, body, .. } => {
                let Some(sym_ty) = self.symbol_var(decl_id) else { return };
                let declared = self.registry.type_of_decl(self.module, self.types, decl_id);
                self.equality(sym_ty, declared, anchor, range, DerivationStep::Annotation);
                for p in &generic_params {
                    self.generate_decl(*p, None);
                }
                for p in &params {
                    self.generate_decl(*p, None);
                }
                let codomain_ty = match codomain {
                    Some(sig) => self.registry.sig_to_type(self.module, self.types, sig),
                    None => self.registry.anything(self.types),
                };
                if let Some(body) = body {
                    self.generate_stmt(body, Some(codomain_ty));
                }
            }
            Parameter { sig, .. } => {
                let Some(sym_ty) = self.symbol_var(decl_id) else { return };
                let declared = self.registry.sig_to_type(self.module, self.types, sig);
                self.equality(sym_ty, declared, anchor, range, DerivationStep::Annotation);
            }
            GenericParameter => {
                let Some(sym_ty) = self.symbol_var(decl_id) else { return };
                let declared = self.registry.type_of_decl(self.module, self.types, decl_id);
                self.equality(sym_ty, declared, anchor, range, DerivationStep::Annotation);
            }
            Struct { generic_params, members, .. } | Interface { generic_params, members, .. } => {
                if let Some(sym_ty) = self.symbol_var(decl_id) {
                    let declared = self.registry.type_of_decl(self.module, self.types, decl_id);
                    self.equality(sym_ty, declared, anchor, range, DerivationStep::Annotation);
                }
                for p in generic_params {
                    self.generate_decl(p, None);
                }
                for m in members {
                    self.generate_decl(m, None);
                }
            }
            Union { generic_params, cases, members, .. } => {
                if let Some(sym_ty) = self.symbol_var(decl_id) {
                    let declared = self.registry.type_of_decl(self.module, self.types, decl_id);
                    self.equality(sym_ty, declared, anchor, range, DerivationStep::Annotation);
                }
                for p in generic_params {
                    self.generate_decl(p, None);
                }
                for c in cases {
                    self.generate_decl(c, None);
                }
                for m in members {
                    self.generate_decl(m, None);
                }
            }
            UnionTypeCase { .. } | UnionAliasCase { .. } => {}
            TypeExtension { members, .. } => {
                // Admitting an extension invalidates every member-lookup
                // table (spec.md §9 Open Question (a), resolved globally).
                self.types.bump_generation();
                for m in members {
                    self.generate_decl(m, None);
                }
            }
            BuiltinType => {}
            MainCode { body, .. } => {
                let top = self.registry.anything(self.types);
                self.generate_stmt(body, return_ty.or(Some(top)));
            }
        }
    }

    /// Fixes the qualifier of a property symbol (spec.md §9 Open Question
    /// (b)): whatever `@cst`/`@mut` the declaration's signature names
    /// explicitly; absent that, `@cst` unless the initializer is a
    /// move/alias from a source symbol already resolved to a single,
    /// already-`@mut` candidate.
    ///
    /// `generate_module` takes `&Module`, not `&mut Module`, so the result
    /// is exposed through `property_qualifiers` rather than written back
    /// onto the symbol here; `solve.rs` folds it in once it has `&mut
    /// Module`.
    fn resolve_property_qualifier(&mut self, decl_id: DeclId) {
        let wardc_ast::DeclKind::Property { qualified_sig, init } = &self.module.decl(decl_id).kind else {
            return;
        };
        if let Some(sig) = qualified_sig {
            if let wardc_ast::SigKind::Qualified { qualifiers, .. } = self.module.sig(*sig).kind {
                if !qualifiers.is_unresolved() {
                    self.property_qualifiers.insert(decl_id, qualifiers);
                    return;
                }
            }
        }
        let mut mutable = false;
        if let Some((op, expr)) = init {
            if matches!(op, AssignKind::Move | AssignKind::Alias) {
                if let ExprKind::Identifier { candidates, .. } = &self.module.expr(*expr).kind {
                    if let [source] = candidates.as_slice() {
                        mutable = self.module.symbol(*source).ty.qualifiers.is_mutable();
                    }
                }
            }
        }
        let resolved =
            if mutable { wardc_types::QualifierSet::mutable() } else { wardc_types::QualifierSet::cst() };
        self.property_qualifiers.insert(decl_id, resolved);
    }

    fn generate_stmt(&mut self, stmt_id: StmtId, return_ty: Option<TypeId>) {
        let anchor = Anchor::Stmt(stmt_id.0 as u64);
        let range = self.module.stmt(stmt_id).range;
        let kind = self.module.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Brace { context, stmts } => {
                let locals = self.module.contexts.contexts[context].declarations.clone();
                for d in locals {
                    self.generate_decl(d, return_ty);
                }
                for s in stmts {
                    self.generate_stmt(s, return_ty);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.generate_expr(cond);
                let cond_ty = self.expr_var(cond);
                let bool_ty = self.registry.bool(self.types);
                self.equality(cond_ty, bool_ty, anchor, range, DerivationStep::Condition);
                self.generate_stmt(then_branch, return_ty);
                if let Some(e) = else_branch {
                    self.generate_stmt(e, return_ty);
                }
            }
            StmtKind::While { cond, body } => {
                self.generate_expr(cond);
                let cond_ty = self.expr_var(cond);
                let bool_ty = self.registry.bool(self.types);
                self.equality(cond_ty, bool_ty, anchor, range, DerivationStep::Condition);
                self.generate_stmt(body, return_ty);
            }
            StmtKind::Binding { lvalue, rvalue, .. } => {
                self.generate_expr(lvalue);
                self.generate_expr(rvalue);
                let l = self.expr_var(lvalue);
                let r = self.expr_var(rvalue);
                self.equality(l, r, anchor, range, DerivationStep::Rvalue);
            }
            StmtKind::Return { value } => {
                if let Some(e) = value {
                    self.generate_expr(e);
                    let v = self.expr_var(e);
                    let expected = return_ty.unwrap_or_else(|| self.registry.anything(self.types));
                    self.equality(v, expected, anchor, range, DerivationStep::Codomain);
                }
            }
            StmtKind::Invalid => {}
        }
    }

    fn generate_expr(&mut self, expr_id: ExprId) {
        if !self.visited_exprs.insert(expr_id) {
            return;
        }
        let anchor = Anchor::Expr(expr_id.0 as u64);
        let range = self.module.expr(expr_id).range;
        let var = self.expr_var(expr_id);
        let kind = self.module.expr(expr_id).kind.clone();
        match kind {
            ExprKind::Null => {
                let error = self.types.error_type();
                self.equality(var, error, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::Lambda { params, body, .. } => {
                for p in &params {
                    self.generate_decl(*p, None);
                }
                let domain: Vec<FunctionParam> = params
                    .iter()
                    .map(|p| {
                        let sig = match &self.module.decl(*p).kind {
                            wardc_ast::DeclKind::Parameter { sig, .. } => *sig,
                            _ => unreachable!("lambda parameter decl is always Parameter"),
                        };
                        let ty = self.registry.sig_to_type(self.module, self.types, sig);
                        FunctionParam { label: None, ty: QualifiedType::unresolved(ty) }
                    })
                    .collect();
                let ret_var = self.types.get_type_var();
                self.generate_stmt(body, Some(ret_var));
                let fn_ty = self.types.get_function(&[], &domain, QualifiedType::unresolved(ret_var));
                self.equality(var, fn_ty, anchor, range, DerivationStep::Codomain);
            }
            ExprKind::UnsafeCast { operand, target } => {
                self.generate_expr(operand);
                let target_ty = self.registry.sig_to_type(self.module, self.types, target);
                self.equality(var, target_ty, anchor, range, DerivationStep::Annotation);
            }
            ExprKind::Infix { lhs, rhs, .. } => {
                // Operator overloading through the same disjunction
                // machinery as named calls is a real extension this core
                // doesn't need: none of spec.md's concrete scenarios
                // exercise operator overload sets, so infix is generated
                // as a homogeneous binary op (both operands and the
                // result share a type) rather than resolved against a
                // named operator function symbol (binding never records
                // candidates for `op` — see `bind.rs`).
                self.generate_expr(lhs);
                self.generate_expr(rhs);
                let l = self.expr_var(lhs);
                let r = self.expr_var(rhs);
                self.equality(r, l, anchor, range, DerivationStep::BinaryRhs);
                self.equality(var, l, anchor, range, DerivationStep::BinaryOperator);
            }
            ExprKind::Prefix { operand, .. } => {
                self.generate_expr(operand);
                let o = self.expr_var(operand);
                self.equality(var, o, anchor, range, DerivationStep::BinaryOperator);
            }
            ExprKind::Call { callee, args } => {
                self.generate_expr(callee);
                let callee_ty = self.expr_var(callee);
                let mut domain = Vec::with_capacity(args.len());
                for arg_id in &args {
                    // An argument is usually its own `CallArgument` node
                    // (carrying an optional label), but the binder walks
                    // `args` generically (`bind_expr`), so a bare
                    // expression in argument position is legal too.
                    let label = match &self.module.expr(*arg_id).kind {
                        ExprKind::CallArgument { label, .. } => *label,
                        _ => None,
                    };
                    self.generate_expr(*arg_id);
                    let arg_var = self.expr_var(*arg_id);
                    domain.push(FunctionParam { label, ty: QualifiedType::unresolved(arg_var) });
                }
                let shape = self.types.get_function(&[], &domain, QualifiedType::unresolved(var));
                self.equality(callee_ty, shape, anchor, range, DerivationStep::Call);
            }
            ExprKind::CallArgument { value, .. } => {
                self.generate_expr(value);
                let v = self.expr_var(value);
                self.equality(var, v, anchor, range, DerivationStep::Rvalue);
            }
            ExprKind::Identifier { candidates, .. } => self.generate_identifier(var, &candidates, anchor, range),
            ExprKind::Select { base, member } => {
                self.generate_expr(base);
                let base_ty = self.expr_var(base);
                self.push(
                    ConstraintKind::ValueMember { base: base_ty, name: member, member_ty: var },
                    Location::new(anchor, range, DerivationStep::Select),
                );
            }
            ExprKind::ImplicitSelect { .. } => {
                // No enclosing-type context is threaded through
                // generation (the base would come from the expected type
                // at the use site, which spec.md leaves to a pass this
                // core doesn't fully specify); resolves to the error type
                // rather than guessing a base.
                let error = self.types.error_type();
                self.equality(var, error, anchor, range, DerivationStep::Select);
            }
            ExprKind::ArrayLiteral { elements } | ExprKind::SetLiteral { elements } => {
                for e in elements {
                    self.generate_expr(e);
                }
                // No container type exists in the mangling alphabet
                // (spec.md §6 lists only the five scalars and nominal /
                // function forms); a literal's own type is left as
                // `Anything` since it has no narrower built-in home here.
                let anything = self.registry.anything(self.types);
                self.equality(var, anything, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::MapLiteral { entries } => {
                for (k, v) in entries {
                    self.generate_expr(k);
                    self.generate_expr(v);
                }
                let anything = self.registry.anything(self.types);
                self.equality(var, anything, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::BoolLiteral(_) => {
                let b = self.registry.bool(self.types);
                self.equality(var, b, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::IntLiteral(_) => {
                let i = self.registry.int(self.types);
                self.equality(var, i, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::FloatLiteral(_) => {
                let f = self.registry.float(self.types);
                self.equality(var, f, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::StringLiteral(_) => {
                let s = self.registry.string(self.types);
                self.equality(var, s, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::Paren(inner) => {
                self.generate_expr(inner);
                let i = self.expr_var(inner);
                self.equality(var, i, anchor, range, DerivationStep::Identifier);
            }
            ExprKind::Invalid => {
                let error = self.types.error_type();
                self.equality(var, error, anchor, range, DerivationStep::Identifier);
            }
        }
    }

    fn generate_identifier(&mut self, var: TypeId, candidates: &SmallVec<[SymbolId; 1]>, anchor: Anchor, range: wardc_util::SourceRange) {
        if candidates.is_empty() {
            // Already reported by name binding (`undefined symbol`); don't
            // double-report, just let the variable resolve to the error
            // type so later reification doesn't fail for an independent
            // reason.
            let error = self.types.error_type();
            self.equality(var, error, anchor, range, DerivationStep::Identifier);
            return;
        }
        if let [only] = candidates.as_slice() {
            let decl = self.module.symbol(*only).decl;
            let declared = self.registry.type_of_decl(self.module, self.types, decl);
            let opened = open_tracked(self.types, declared, &mut self.opened_vars);
            self.equality(var, opened, anchor, range, DerivationStep::Identifier);
            return;
        }
        let branches = candidates
            .iter()
            .map(|&symbol_id| {
                let decl = self.module.symbol(symbol_id).decl;
                let declared = self.registry.type_of_decl(self.module, self.types, decl);
                let opened = open_tracked(self.types, declared, &mut self.opened_vars);
                Constraint::new(
                    ConstraintKind::Equality { lhs: var, rhs: opened },
                    Location::new(anchor, range, DerivationStep::Identifier),
                )
            })
            .collect();
        self.push(ConstraintKind::Disjunction { branches }, Location::new(anchor, range, DerivationStep::Identifier));
    }
}
