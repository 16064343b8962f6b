//! The visitor protocol (spec.md §4.2).
//!
//! `accept(visitor)` is `visitor.visit_*(module, id)`; `traverse` is the
//! `walk_*` free function below. The default `visit_*` method just calls
//! `walk_*`, so overriding nothing gives full depth-first pre-order
//! traversal (spec.md §8 "Visitor traversal coverage") for free; a
//! visitor overrides exactly the node kinds it cares about.
//!
//! Every node's children are visited in the fixed category order spec.md
//! §4.2 specifies — declarations, then signatures, then statements, then
//! expressions — *not* left-to-right source order when a node mixes
//! categories (e.g. `if` visits its branches before its condition).
//! Within one category, children are visited left to right.

use crate::decl::DeclKind;
use crate::expr::ExprKind;
use crate::ids::{DeclId, ExprId, SigId, StmtId};
use crate::module::Module;
use crate::sig::SigKind;
use crate::stmt::StmtKind;

pub trait Visitor {
    fn visit_decl(&mut self, module: &Module, id: DeclId) {
        walk_decl(self, module, id);
    }
    fn visit_sig(&mut self, module: &Module, id: SigId) {
        walk_sig(self, module, id);
    }
    fn visit_stmt(&mut self, module: &Module, id: StmtId) {
        walk_stmt(self, module, id);
    }
    fn visit_expr(&mut self, module: &Module, id: ExprId) {
        walk_expr(self, module, id);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, module: &Module, id: DeclId) {
    walk_decl_kind(v, module, id);
    for attr in module.decl(id).attrs.clone() {
        for arg in attr.args {
            v.visit_expr(module, arg);
        }
    }
}

fn walk_decl_kind<V: Visitor + ?Sized>(v: &mut V, module: &Module, id: DeclId) {
    match module.decl(id).kind.clone() {
        DeclKind::Property { qualified_sig, init } => {
            if let Some(sig) = qualified_sig {
                v.visit_sig(module, sig);
            }
            if let Some((_, expr)) = init {
                v.visit_expr(module, expr);
            }
        }
        DeclKind::Function { generic_params, params, codomain, body, .. } => {
            for d in generic_params {
                v.visit_decl(module, d);
            }
            for d in params {
                v.visit_decl(module, d);
            }
            if let Some(sig) = codomain {
                v.visit_sig(module, sig);
            }
            if let Some(stmt) = body {
                v.visit_stmt(module, stmt);
            }
        }
        DeclKind::Parameter { sig, .. } => v.visit_sig(module, sig),
        DeclKind::GenericParameter => {}
        DeclKind::Struct { generic_params, members, interfaces, .. } => {
            for d in generic_params {
                v.visit_decl(module, d);
            }
            for d in members {
                v.visit_decl(module, d);
            }
            for s in interfaces {
                v.visit_sig(module, s);
            }
        }
        DeclKind::Union { generic_params, cases, members, interfaces, .. } => {
            for d in generic_params {
                v.visit_decl(module, d);
            }
            for d in cases {
                v.visit_decl(module, d);
            }
            for d in members {
                v.visit_decl(module, d);
            }
            for s in interfaces {
                v.visit_sig(module, s);
            }
        }
        DeclKind::Interface { generic_params, members, .. } => {
            for d in generic_params {
                v.visit_decl(module, d);
            }
            for d in members {
                v.visit_decl(module, d);
            }
        }
        DeclKind::UnionTypeCase { payload } => {
            for s in payload {
                v.visit_sig(module, s);
            }
        }
        DeclKind::UnionAliasCase { aliased } => v.visit_sig(module, aliased),
        DeclKind::TypeExtension { extended, interfaces, members, .. } => {
            for d in members {
                v.visit_decl(module, d);
            }
            v.visit_sig(module, extended);
            for s in interfaces {
                v.visit_sig(module, s);
            }
        }
        DeclKind::BuiltinType => {}
        DeclKind::MainCode { body, .. } => v.visit_stmt(module, body),
    }
}

pub fn walk_sig<V: Visitor + ?Sized>(v: &mut V, module: &Module, id: SigId) {
    match module.sig(id).kind.clone() {
        SigKind::Qualified { inner, .. } => v.visit_sig(module, inner),
        SigKind::Identifier { generic_args, .. } => {
            for s in generic_args {
                v.visit_sig(module, s);
            }
        }
        SigKind::Nested { base, generic_args, .. } => {
            v.visit_sig(module, base);
            for s in generic_args {
                v.visit_sig(module, s);
            }
        }
        SigKind::ImplicitNested { .. } => {}
        SigKind::Function { generic_params, params, codomain } => {
            for d in generic_params {
                v.visit_decl(module, d);
            }
            for p in params {
                v.visit_sig(module, p.sig);
            }
            v.visit_sig(module, codomain);
        }
        SigKind::Parameter(p) => v.visit_sig(module, p.sig),
        SigKind::Invalid => {}
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, module: &Module, id: StmtId) {
    match module.stmt(id).kind.clone() {
        StmtKind::Brace { stmts, .. } => {
            for s in stmts {
                v.visit_stmt(module, s);
            }
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            v.visit_stmt(module, then_branch);
            if let Some(e) = else_branch {
                v.visit_stmt(module, e);
            }
            v.visit_expr(module, cond);
        }
        StmtKind::While { cond, body } => {
            v.visit_stmt(module, body);
            v.visit_expr(module, cond);
        }
        StmtKind::Binding { lvalue, rvalue, .. } => {
            v.visit_expr(module, lvalue);
            v.visit_expr(module, rvalue);
        }
        StmtKind::Return { value } => {
            if let Some(e) = value {
                v.visit_expr(module, e);
            }
        }
        StmtKind::Invalid => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, module: &Module, id: ExprId) {
    match module.expr(id).kind.clone() {
        ExprKind::Null => {}
        ExprKind::Lambda { params, body, .. } => {
            for d in params {
                v.visit_decl(module, d);
            }
            v.visit_stmt(module, body);
        }
        ExprKind::UnsafeCast { operand, target } => {
            v.visit_sig(module, target);
            v.visit_expr(module, operand);
        }
        ExprKind::Infix { lhs, rhs, .. } => {
            v.visit_expr(module, lhs);
            v.visit_expr(module, rhs);
        }
        ExprKind::Prefix { operand, .. } => v.visit_expr(module, operand),
        ExprKind::Call { callee, args } => {
            v.visit_expr(module, callee);
            for a in args {
                v.visit_expr(module, a);
            }
        }
        ExprKind::CallArgument { value, .. } => v.visit_expr(module, value),
        ExprKind::Identifier { .. } => {}
        ExprKind::Select { base, .. } => v.visit_expr(module, base),
        ExprKind::ImplicitSelect { .. } => {}
        ExprKind::ArrayLiteral { elements } | ExprKind::SetLiteral { elements } => {
            for e in elements {
                v.visit_expr(module, e);
            }
        }
        ExprKind::MapLiteral { entries } => {
            for (k, val) in entries {
                v.visit_expr(module, k);
                v.visit_expr(module, val);
            }
        }
        ExprKind::BoolLiteral(_) | ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_) | ExprKind::StringLiteral(_) => {}
        ExprKind::Paren(inner) => v.visit_expr(module, inner),
        ExprKind::Invalid => {}
    }
}
