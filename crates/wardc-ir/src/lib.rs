//! The register-based intermediate representation (spec.md §4.6): a
//! flat, SSA-like "low-form" lowered from the typed, bound and solved
//! AST `wardc-sem` hands back.
//!
//! - [`ir`] — the data model itself (`Unit`, `Function`, `BasicBlock`,
//!   `Instr`).
//! - [`mangle`] — turns a declaration's qualified name and solved type
//!   into the flat string a `Unit` keys functions by (spec.md §6).
//! - [`text`] — the textual inspection form used by this crate's own
//!   tests, plus a parser back to [`ir::Function`] (SPEC_FULL.md §3).
//! - [`lower`] — the AST-to-IR lowering pass itself.

pub mod ir;
pub mod lower;
pub mod mangle;
pub mod text;

pub use ir::{AssignOp, BasicBlock, Const, Function, Instr, Operand, Register, Unit};
pub use lower::lower_module;
pub use mangle::{mangle_decl, mangle_type, ScopeChain};

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_ast::{AssignKind, Decl, DeclKind, Expr, ExprKind, Module, ModuleId, Stmt, StmtKind};
    use wardc_types::TypeContext;
    use wardc_util::{Interner, SourceRange};

    fn new_module(interner: &mut Interner) -> Module {
        Module::new(ModuleId(0), interner.intern("main"))
    }

    /// Mirrors `wardc-sem`'s own "int literal assignment" scenario
    /// (spec.md §8 scenario 1): `let x = 1` inside `main`'s body should
    /// lower to a `make_ref`, a `copy` of the constant `1`, and a bare
    /// `return`.
    #[test]
    fn int_literal_let_lowers_to_make_ref_and_copy() {
        let mut interner = Interner::new();
        let mut module = new_module(&mut interner);
        let mut types = TypeContext::new();
        let int_name = interner.intern("Int");
        let builtin = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(int_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::BuiltinType,
        });
        module.add_top_level(builtin);

        let lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(1) });
        let x_name = interner.intern("x");
        let prop = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, lit)) },
        });

        let context = module.contexts.new_context(Some(module.root_context));
        module.contexts.contexts[context].declarations.push(prop);
        let body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context, stmts: vec![] } });
        let main = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: None,
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::MainCode { context, body },
        });
        module.add_top_level(main);

        let solved = wardc_sem::analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors());

        let unit = lower_module(&module, &mut types, &solved, &interner);
        let main_fn = unit.function("main").expect("main lowered");
        let entry = main_fn.block("entry").expect("entry block");
        assert!(matches!(entry.instructions.first(), Some(Instr::MakeRef { .. })));
        assert!(matches!(
            entry.instructions.get(1),
            Some(Instr::Assign { op: AssignOp::Copy, src: Operand::Const(Const::Int(1)), .. })
        ));
        assert!(matches!(entry.instructions.last(), Some(Instr::Return { value: None })));
    }

    #[test]
    fn empty_main_lowers_to_single_return() {
        let mut interner = Interner::new();
        let mut module = new_module(&mut interner);
        let mut types = TypeContext::new();
        let context = module.contexts.new_context(Some(module.root_context));
        let body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context, stmts: vec![] } });
        let main = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: None,
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::MainCode { context, body },
        });
        module.add_top_level(main);

        let solved = wardc_sem::analyze_module(&mut module, &mut types, &mut interner);
        let unit = lower_module(&module, &mut types, &solved, &interner);
        let main_fn = unit.function("main").expect("main lowered");
        let entry = main_fn.block("entry").expect("entry block");
        assert_eq!(entry.instructions.len(), 1);
        assert!(matches!(entry.instructions[0], Instr::Return { value: None }));
    }
}
