//! An in-memory [`ModuleLoader`] standing in for the concrete parser
//! spec.md §1 scopes out of the core ("the lexer and concrete parser
//! ... feed the core an AST"). Each named fixture builds one of spec.md
//! §8's concrete scenarios directly with `wardc-ast`'s arena API, the
//! same technique `wardc-sem`'s and `wardc-ir`'s own `#[cfg(test)]`
//! modules use to stand up a module without a parser.
//!
//! This is the only place in the workspace that invents source programs;
//! everything downstream of [`ModuleLoader::load`] is the real pipeline.

use crate::ModuleLoader;
use wardc_ast::{AssignKind, Decl, DeclKind, Expr, ExprKind, Module, ModuleId, Stmt, StmtKind};
use wardc_util::{Interner, Name, SourceRange};

/// Names every fixture [`DemoLoader`] can build, in the order
/// [`DemoLoader::names`] lists them.
pub const PROGRAM_NAMES: &[&str] = &["empty", "let-x", "if-else", "closure"];

/// Builds one of a fixed set of named demo programs rather than parsing
/// text — the CLI's stand-in for a real frontend (SPEC_FULL.md §4: "a
/// runnable end-to-end demonstration ... via an in-memory `ModuleLoader`
/// rather than a real parser").
#[derive(Default)]
pub struct DemoLoader;

impl DemoLoader {
    pub fn names(&self) -> &'static [&'static str] {
        PROGRAM_NAMES
    }
}

impl ModuleLoader for DemoLoader {
    fn load(&mut self, id: ModuleId, program: &str, interner: &mut Interner) -> anyhow::Result<Module> {
        match program {
            "empty" => Ok(empty_main(id, interner)),
            "let-x" => Ok(let_x_one(id, interner)),
            "if-else" => Ok(if_else(id, interner)),
            "closure" => Ok(closure_capture(id, interner)),
            other => anyhow::bail!("no such demo program `{other}` (known: {:?})", PROGRAM_NAMES),
        }
    }
}

fn synthetic_name(interner: &mut Interner, module: &str) -> Name {
    interner.intern(module)
}

fn builtin_int(module: &mut Module, interner: &mut Interner) {
    let int_name = interner.intern("Int");
    let decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(int_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::BuiltinType,
    });
    module.add_top_level(decl);
}

/// spec.md §8 baseline: an empty `main` body. Every other fixture starts
/// from the same wrapper; this one demonstrates the pipeline runs to
/// completion with nothing in it.
fn empty_main(id: ModuleId, interner: &mut Interner) -> Module {
    let name = synthetic_name(interner, "empty");
    let mut module = Module::new(id, name);

    let root = module.root_context;
    let context = module.contexts.new_context(Some(root));
    let body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context, stmts: vec![] } });
    let main = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: None,
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::MainCode { context, body },
    });
    module.add_top_level(main);
    module
}

/// spec.md §8 scenario 1: `let x = 1`. Expected: `x` typed `Int`; IR
/// contains `make_ref Int` then `copy 1 -> %x`.
fn let_x_one(id: ModuleId, interner: &mut Interner) -> Module {
    let name = synthetic_name(interner, "let-x");
    let mut module = Module::new(id, name);
    builtin_int(&mut module, interner);

    let root = module.root_context;
    let context = module.contexts.new_context(Some(root));

    let lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(1) });
    let x_name = interner.intern("x");
    let x_decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(x_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, lit)) },
    });
    module.contexts.contexts[context].declarations.push(x_decl);

    let body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context, stmts: vec![] } });
    let main = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: None,
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::MainCode { context, body },
    });
    module.add_top_level(main);
    module
}

/// spec.md §8 scenario 5: `if true { let a = 1 } else { let b = 2 }`
/// lowers to three blocks (`then`/`else`/merge) joined by a `branch` and
/// two `jump`s.
fn if_else(id: ModuleId, interner: &mut Interner) -> Module {
    let name = synthetic_name(interner, "if-else");
    let mut module = Module::new(id, name);
    builtin_int(&mut module, interner);

    let root = module.root_context;
    let main_ctx = module.contexts.new_context(Some(root));

    let then_ctx = module.contexts.new_context(Some(main_ctx));
    let a_lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(1) });
    let a_name = interner.intern("a");
    let a_decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(a_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, a_lit)) },
    });
    module.contexts.contexts[then_ctx].declarations.push(a_decl);
    let then_branch = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context: then_ctx, stmts: vec![] } });

    let else_ctx = module.contexts.new_context(Some(main_ctx));
    let b_lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(2) });
    let b_name = interner.intern("b");
    let b_decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(b_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, b_lit)) },
    });
    module.contexts.contexts[else_ctx].declarations.push(b_decl);
    let else_branch = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context: else_ctx, stmts: vec![] } });

    let cond = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::BoolLiteral(true) });
    let if_stmt = module.alloc_stmt(Stmt {
        range: SourceRange::synthetic(),
        kind: StmtKind::If { cond, then_branch, else_branch: Some(else_branch) },
    });

    let body = module.alloc_stmt(Stmt {
        range: SourceRange::synthetic(),
        kind: StmtKind::Brace { context: main_ctx, stmts: vec![if_stmt] },
    });
    let main = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: None,
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::MainCode { context: main_ctx, body },
    });
    module.add_top_level(main);
    module
}

/// spec.md §8 scenario 6: a lambda referring to an outer `let k = 3`
/// lowers to a function whose domain is extended with `k`'s type, bound
/// to its value by a `partial_apply` at the binding site.
fn closure_capture(id: ModuleId, interner: &mut Interner) -> Module {
    let name = synthetic_name(interner, "closure");
    let mut module = Module::new(id, name);
    builtin_int(&mut module, interner);

    let root = module.root_context;
    let main_ctx = module.contexts.new_context(Some(root));

    let k_lit = module.alloc_expr(Expr { range: SourceRange::synthetic(), kind: ExprKind::IntLiteral(3) });
    let k_name = interner.intern("k");
    let k_decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(k_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, k_lit)) },
    });
    module.contexts.contexts[main_ctx].declarations.push(k_decl);

    // The lambda: `{ || k }` — no parameters, body returns the captured `k`.
    let lambda_ctx = module.contexts.new_context(Some(main_ctx));
    let k_ref = module.alloc_expr(Expr {
        range: SourceRange::synthetic(),
        kind: ExprKind::Identifier { name: k_name, candidates: Default::default() },
    });
    let lambda_body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Return { value: Some(k_ref) } });
    let lambda = module.alloc_expr(Expr {
        range: SourceRange::synthetic(),
        kind: ExprKind::Lambda { params: vec![], body: lambda_body, context: lambda_ctx },
    });

    let f_name = interner.intern("f");
    let f_decl = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: Some(f_name),
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::Property { qualified_sig: None, init: Some((AssignKind::Copy, lambda)) },
    });
    module.contexts.contexts[main_ctx].declarations.push(f_decl);

    let body = module.alloc_stmt(Stmt { range: SourceRange::synthetic(), kind: StmtKind::Brace { context: main_ctx, stmts: vec![] } });
    let main = module.alloc_decl(Decl {
        range: SourceRange::synthetic(),
        name: None,
        modifiers: vec![],
        attrs: vec![],
        kind: DeclKind::MainCode { context: main_ctx, body },
    });
    module.add_top_level(main);
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_program_loads() {
        let mut interner = Interner::new();
        let mut loader = DemoLoader;
        for (i, name) in PROGRAM_NAMES.iter().enumerate() {
            let module = loader.load(ModuleId(i as u32), name, &mut interner).unwrap();
            assert!(!module.declarations.is_empty());
        }
    }

    #[test]
    fn unknown_program_name_errors() {
        let mut interner = Interner::new();
        let mut loader = DemoLoader;
        assert!(loader.load(ModuleId(0), "does-not-exist", &mut interner).is_err());
    }
}
