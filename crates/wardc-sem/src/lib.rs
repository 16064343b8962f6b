//! Semantic analysis: name binding, constraint generation and the
//! constraint solver (spec.md §4.2 through §4.5), wired into the single
//! `analyze_module` entry point the driver calls after parsing.
//!
//! Three independent passes over one [`wardc_ast::Module`]:
//!
//! 1. [`bind::bind_module`] builds the scope tree and resolves every
//!    identifier (and type-signature name) to its candidate symbols.
//! 2. [`generate::generate_module`] walks the bound module once, emitting
//!    one or more typing constraints per node.
//! 3. [`solve::solve_module`] finds the substitution that satisfies every
//!    constraint (or reports why none does), and [`solve::apply_outcome`]
//!    writes the solved types back onto the module's expressions and
//!    symbols.

pub mod bind;
pub mod constraint;
pub mod generate;
pub mod registry;
pub mod solve;

use rustc_hash::FxHashMap;
use wardc_ast::{ExprId, Module};
use wardc_types::{TypeContext, TypeId};
use wardc_util::Interner;

pub use constraint::{Anchor, Constraint, ConstraintKind, DerivationStep, Location};
pub use registry::TypeRegistry;
pub use solve::{apply_outcome, solve_module, SolveOutcome, Substitution};

/// Every expression's solved type, keyed by the expression node it belongs
/// to (spec.md §3 invariant 3: "every expression node has exactly one
/// type after inference").
pub type SolvedTypes = FxHashMap<ExprId, TypeId>;

/// Runs the full pipeline — bind, generate, solve, reify — over one
/// module, mutating it in place (symbol types, `issues`) and returning the
/// per-expression solved types. `registry` is created fresh per call so a
/// caller analyzing several modules gets an independent declared-type
/// cache for each; `types` is shared across modules so nominal identity
/// and hash-consing hold across module boundaries within one compilation
/// (spec.md §5: the type universe is the one piece of shared state).
pub fn analyze_module(module: &mut Module, types: &mut TypeContext, interner: &mut Interner) -> SolvedTypes {
    let mut registry = TypeRegistry::new(interner);
    analyze_module_with_registry(module, types, &mut registry)
}

/// Same as [`analyze_module`], but takes an already-built [`TypeRegistry`]
/// so a caller analyzing several modules against one shared declared-type
/// cache (built-ins resolve identically everywhere) doesn't pay to
/// rebuild it each time.
pub fn analyze_module_with_registry(
    module: &mut Module,
    types: &mut TypeContext,
    registry: &mut TypeRegistry,
) -> SolvedTypes {
    bind::bind_module(module, types);
    let generated = generate::generate_module(module, types, registry);
    let outcome = solve::solve_module(
        module,
        types,
        registry,
        generated.constraints,
        &generated.opened_vars,
    );
    match outcome {
        Some(outcome) => solve::apply_outcome(module, types, &generated.expr_types, &generated.property_qualifiers, &outcome),
        None => {
            // No solution: every expression's type is left as whatever
            // `generate` assigned it (an unresolved variable), per
            // spec.md §4.5 "no solution" — `module.issues` already
            // carries the diagnostic `solve_module` pushed.
            generated.expr_types
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_ast::{Decl, DeclId, DeclKind, ModuleId, Stmt, StmtKind};
    use wardc_util::SourceRange;

    fn new_module(interner: &mut Interner) -> Module {
        Module::new(ModuleId(0), interner.intern("main"))
    }

    #[test]
    fn analyzing_empty_main_code_leaves_no_errors() {
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
        analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors());
    }

    #[test]
    fn analyzing_int_literal_assignment_solves_property_to_int() {
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

        let lit = module.alloc_expr(wardc_ast::Expr { range: SourceRange::synthetic(), kind: wardc_ast::ExprKind::IntLiteral(1) });
        let x_name = interner.intern("x");
        let prop = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Property { qualified_sig: None, init: Some((wardc_ast::AssignKind::Copy, lit)) },
        });
        module.add_top_level(prop);

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

        let solved = analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors());
        let int_ty = types.get_builtin(int_name);
        assert_eq!(solved.get(&lit).copied(), Some(int_ty));
    }

    fn builtin(module: &mut Module, interner: &mut Interner, name: &str) -> DeclId {
        let n = interner.intern(name);
        let decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(n),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::BuiltinType,
        });
        module.add_top_level(decl);
        decl
    }

    fn sig_ident(module: &mut Module, name: wardc_util::Name) -> wardc_ast::SigId {
        module.alloc_sig(wardc_ast::Sig {
            range: SourceRange::synthetic(),
            kind: wardc_ast::SigKind::Identifier { name, generic_args: vec![], candidates: Default::default() },
        })
    }

    /// `overloaded(x := <arg>)` wired to call the (already-bound-by-name)
    /// `overloaded` identifier.
    fn call_overloaded(
        module: &mut Module,
        overloaded_name: wardc_util::Name,
        x_label: wardc_util::Name,
        arg: wardc_ast::ExprId,
    ) -> ExprId {
        let callee = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::Identifier { name: overloaded_name, candidates: Default::default() },
        });
        let call_arg = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::CallArgument { label: Some(x_label), value: arg },
        });
        module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::Call { callee, args: vec![call_arg] },
        })
    }

    /// Wires up `overloaded<T>(x:T)->T`, `overloaded(x:Int)->Int`,
    /// `overloaded(x:Bool)->Bool` as three top-level function declarations
    /// sharing the name `overloaded`, plus `let <result_name> := overloaded(x := <arg>)`.
    /// Returns `(module, types, interner, call_expr)` so each scenario test
    /// only supplies the differing argument expression and asserts on the
    /// resulting solved type of `call_expr`.
    fn build_overload_fixture(
        arg_kind: wardc_ast::ExprKind,
        result_name_str: &str,
    ) -> (Module, TypeContext, Interner, ExprId) {
        let mut interner = Interner::new();
        let mut types = TypeContext::new();
        let mod_name = interner.intern("m");
        let mut module = Module::new(ModuleId(0), mod_name);

        builtin(&mut module, &mut interner, "Int");
        builtin(&mut module, &mut interner, "Bool");
        builtin(&mut module, &mut interner, "String");
        builtin(&mut module, &mut interner, "Anything");

        let overloaded_name = interner.intern("overloaded");
        let x_name = interner.intern("x");
        let int_name = interner.intern("Int");
        let bool_name = interner.intern("Bool");
        let t_name = interner.intern("T");

        // overloaded<T>(x: T) -> T
        let generic_ctx = module.contexts.new_context(Some(module.root_context));
        let t_decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(t_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::GenericParameter,
        });
        let t_sig_param = sig_ident(&mut module, t_name);
        let x_param_generic = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: Some(x_name), sig: t_sig_param },
        });
        let t_sig_codomain = sig_ident(&mut module, t_name);
        let generic_overload = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(overloaded_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Function {
                generic_params: vec![t_decl],
                params: vec![x_param_generic],
                codomain: Some(t_sig_codomain),
                body: None,
                context: generic_ctx,
            },
        });
        module.add_top_level(generic_overload);

        // overloaded(x: Int) -> Int
        let int_ctx = module.contexts.new_context(Some(module.root_context));
        let int_param_sig = sig_ident(&mut module, int_name);
        let x_param_int = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: Some(x_name), sig: int_param_sig },
        });
        let int_codomain = sig_ident(&mut module, int_name);
        let int_overload = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(overloaded_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Function {
                generic_params: vec![],
                params: vec![x_param_int],
                codomain: Some(int_codomain),
                body: None,
                context: int_ctx,
            },
        });
        module.add_top_level(int_overload);

        // overloaded(x: Bool) -> Bool
        let bool_ctx = module.contexts.new_context(Some(module.root_context));
        let bool_param_sig = sig_ident(&mut module, bool_name);
        let x_param_bool = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: Some(x_name), sig: bool_param_sig },
        });
        let bool_codomain = sig_ident(&mut module, bool_name);
        let bool_overload = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(overloaded_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Function {
                generic_params: vec![],
                params: vec![x_param_bool],
                codomain: Some(bool_codomain),
                body: None,
                context: bool_ctx,
            },
        });
        module.add_top_level(bool_overload);

        let arg = module.alloc_expr(wardc_ast::Expr { range: SourceRange::synthetic(), kind: arg_kind });
        let call = call_overloaded(&mut module, overloaded_name, x_name, arg);

        let result_name = interner.intern(result_name_str);
        let result_decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(result_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Property { qualified_sig: None, init: Some((wardc_ast::AssignKind::Move, call)) },
        });
        module.add_top_level(result_decl);

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

        (module, types, interner, call)
    }

    #[test]
    fn overload_resolution_picks_the_int_specific_candidate() {
        // spec.md §8 scenario 2: `overloaded(x := 0)` among
        // `overloaded<T>(x:T)->T`, `overloaded(x:Int)->Int`,
        // `overloaded(x:Bool)->Bool` resolves to the `Int`-specific overload.
        let (mut module, mut types, mut interner, call) =
            build_overload_fixture(wardc_ast::ExprKind::IntLiteral(0), "a");
        let solved = analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors(), "issues: {:?}", module.issues.in_display_order());
        let int_name = interner.intern("Int");
        let int_ty = types.get_builtin(int_name);
        assert_eq!(solved.get(&call).copied(), Some(int_ty));
    }

    #[test]
    fn overload_resolution_falls_back_to_the_generic_candidate() {
        // spec.md §8 scenario 3: `overloaded(x := "Hello")` has no
        // String-specific overload, so the generic `overloaded<T>(x:T)->T`
        // is the only candidate left standing, typing the call `String`.
        let (mut module, mut types, mut interner, call) =
            build_overload_fixture(wardc_ast::ExprKind::StringLiteral("Hello".to_string()), "c");
        let solved = analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors(), "issues: {:?}", module.issues.in_display_order());
        let string_name = interner.intern("String");
        let string_ty = types.get_builtin(string_name);
        assert_eq!(solved.get(&call).copied(), Some(string_ty));
    }

    #[test]
    fn non_linear_generic_call_joins_mismatched_arguments_to_anything() {
        // spec.md §8 scenario 4: `poly<T>(x:T, y:T)->T` called as
        // `poly(x := 0, y := false)` has no concrete overload to fall back
        // on (the only declaration is the generic one, and `T` occurs
        // twice); the solver's non-linear-generic join rebinds `T` to
        // `Anything` instead of failing outright.
        let mut interner = Interner::new();
        let mut types = TypeContext::new();
        let mod_name = interner.intern("m");
        let mut module = Module::new(ModuleId(0), mod_name);

        builtin(&mut module, &mut interner, "Int");
        builtin(&mut module, &mut interner, "Bool");
        builtin(&mut module, &mut interner, "Anything");

        let poly_name = interner.intern("poly");
        let x_name = interner.intern("x");
        let y_name = interner.intern("y");
        let t_name = interner.intern("T");

        let ctx = module.contexts.new_context(Some(module.root_context));
        let t_decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(t_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::GenericParameter,
        });
        let t_sig_x = sig_ident(&mut module, t_name);
        let x_param = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(x_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: Some(x_name), sig: t_sig_x },
        });
        let t_sig_y = sig_ident(&mut module, t_name);
        let y_param = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(y_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Parameter { label: Some(y_name), sig: t_sig_y },
        });
        let t_sig_codomain = sig_ident(&mut module, t_name);
        let poly = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(poly_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Function {
                generic_params: vec![t_decl],
                params: vec![x_param, y_param],
                codomain: Some(t_sig_codomain),
                body: None,
                context: ctx,
            },
        });
        module.add_top_level(poly);

        let zero = module.alloc_expr(wardc_ast::Expr { range: SourceRange::synthetic(), kind: wardc_ast::ExprKind::IntLiteral(0) });
        let false_ = module.alloc_expr(wardc_ast::Expr { range: SourceRange::synthetic(), kind: wardc_ast::ExprKind::BoolLiteral(false) });
        let callee = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::Identifier { name: poly_name, candidates: Default::default() },
        });
        let arg_x = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::CallArgument { label: Some(x_name), value: zero },
        });
        let arg_y = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::CallArgument { label: Some(y_name), value: false_ },
        });
        let call = module.alloc_expr(wardc_ast::Expr {
            range: SourceRange::synthetic(),
            kind: wardc_ast::ExprKind::Call { callee, args: vec![arg_x, arg_y] },
        });

        let c_name = interner.intern("c");
        let c_decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: Some(c_name),
            modifiers: vec![],
            attrs: vec![],
            kind: DeclKind::Property { qualified_sig: None, init: Some((wardc_ast::AssignKind::Move, call)) },
        });
        module.add_top_level(c_decl);

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

        let solved = analyze_module(&mut module, &mut types, &mut interner);
        assert!(!module.issues.has_errors(), "issues: {:?}", module.issues.in_display_order());
        let anything_name = interner.intern("Anything");
        let anything_ty = types.get_builtin(anything_name);
        assert_eq!(solved.get(&call).copied(), Some(anything_ty));
    }
}
