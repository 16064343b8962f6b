//! The compiler driver: orchestrates the pipeline spec.md §2 lays out —
//! module loading, name binding, constraint generation, constraint
//! solving, IR lowering, interpretation — and nothing else. Every pass
//! itself lives in its own crate (`wardc-sem`, `wardc-ir`,
//! `wardc-interp`); this crate only sequences them and applies spec.md
//! §7's fatal/non-fatal policy between phases.
//!
//! Grounded on `faxc-drv/src/lib.rs`'s phase-sequencing `Session`/`compile`
//! shape, re-targeted at this core's actual data flow (bind -> generate
//! -> solve -> lower -> interpret) instead of the teacher's
//! lex -> parse -> codegen -> link pipeline, which spec.md §1 explicitly
//! scopes out of the core.
//!
//! spec.md §6: "No CLI surface, environment variables, or persisted state
//! belong to the core." Accordingly this crate carries no config file or
//! env var reads beyond `RUST_LOG` (read by `tracing-subscriber`'s
//! `EnvFilter` in `main.rs`, not here) — a caller embedding `wardc-drv` as
//! a library never needs a CLI at all.

pub mod fixtures;

use wardc_ast::{Module, ModuleId};
use wardc_interp::{InterpError, Value};
use wardc_ir::Unit;
use wardc_sem::{SolvedTypes, TypeRegistry};
use wardc_types::TypeContext;
use wardc_util::{Interner, Issue};

/// The external collaborator spec.md §6 carves the frontend out to:
/// "`load(module, from_path|from_text, context) -> ()` populates the
/// module's declaration list by parsing. Failures are raised as issues
/// attached to the module." No concrete lexer/parser lives in this
/// workspace (spec.md §1 Non-goals); [`fixtures::DemoLoader`] is the one
/// implementation this crate ships, standing in for a real frontend so
/// the CLI has something to run end to end.
pub trait ModuleLoader {
    /// Build and return a fresh [`Module`] named `program`, already
    /// admitted under `id`. A real loader would read `program` as a path
    /// or module identifier and attach parse failures as [`Issue`]s on
    /// the returned module instead of erroring outright; since this core
    /// never parses, the one implementation shipped here
    /// ([`fixtures::DemoLoader`]) treats an unrecognized name as a hard
    /// error rather than a recoverable one.
    fn load(&mut self, id: ModuleId, program: &str, interner: &mut Interner) -> anyhow::Result<Module>;
}

/// The process-wide shared state spec.md §5 names: "the type-interning
/// table and module map ... accessed only by the driver between module
/// passes." `next_module` is this driver's module-admission counter (the
/// "module map" spec.md refers to is the caller's own collection of
/// admitted [`Module`]s; this context only owns what every module's
/// pipeline run needs in common).
pub struct CompilerContext {
    pub types: TypeContext,
    pub interner: Interner,
    pub registry: TypeRegistry,
    next_module: u32,
}

impl CompilerContext {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let registry = TypeRegistry::new(&mut interner);
        Self { types: TypeContext::new(), interner, registry, next_module: 0 }
    }

    /// Admits a new module, returning the [`ModuleId`] it should be
    /// constructed under (spec.md §5: "the generation counter is
    /// incremented each time a new module is admitted" — the generation
    /// bump itself lives on `TypeContext`, bumped lazily by extension
    /// admission, not here; this only hands out the next module slot).
    pub fn next_module_id(&mut self) -> ModuleId {
        let id = ModuleId(self.next_module);
        self.next_module += 1;
        id
    }
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new()
    }
}

/// What running one module's pipeline produced. `unit` is `None` exactly
/// when semantic analysis left an error-severity issue behind — spec.md
/// §7's policy that "if the module has any issue of severity error, the
/// driver refuses to run later passes for that module".
pub struct CompiledModule {
    pub solved: SolvedTypes,
    pub unit: Option<Unit>,
}

/// Runs name binding, constraint generation and constraint solving
/// (`wardc-sem`'s single non-fatal unit, spec.md §4.2-§4.5), then lowers
/// to IR (spec.md §4.6) only if that left the module free of
/// error-severity issues.
///
/// spec.md §7: "the name-binding and typing passes are non-fatal ... the
/// user-visible behavior: after each pass, if the module has any issue of
/// severity error, the driver refuses to run later passes for that
/// module but still reports all accumulated issues." Lowering itself is
/// fatal in the sense that an internal inconsistency panics (a compiler
/// bug, not a user error) rather than producing a partial `Unit`.
pub fn compile_module(module: &mut Module, ctx: &mut CompilerContext) -> CompiledModule {
    let module_name = ctx.interner.resolve(module.name).to_string();
    tracing::info!(module = %module_name, "binding names, generating and solving constraints");
    let solved = wardc_sem::analyze_module_with_registry(module, &mut ctx.types, &mut ctx.registry);

    if module.issues.has_errors() {
        tracing::warn!(
            module = %module_name,
            issues = module.issues.len(),
            "semantic analysis left error-severity issues; skipping lowering"
        );
        return CompiledModule { solved, unit: None };
    }

    tracing::debug!(module = %module_name, "lowering to IR");
    let unit = wardc_ir::lower_module(module, &mut ctx.types, &solved, &ctx.interner);
    tracing::debug!(module = %module_name, functions = unit.functions.len(), "lowering complete");
    CompiledModule { solved, unit: Some(unit) }
}

/// Interprets `entry` with no arguments — the shape every spec.md §8
/// scenario uses (`main` takes nothing). Runtime errors (spec.md §7
/// taxonomy item 5) are fatal to the run, not to the process: the caller
/// decides what to do with an `Err`.
pub fn run_entry(unit: &Unit, entry: &str) -> Result<Value, InterpError> {
    tracing::info!(entry, "starting interpreter");
    let result = wardc_interp::run(unit, entry);
    match &result {
        Ok(value) => tracing::info!(%value, "interpreter finished"),
        Err(err) => tracing::error!(%err, "interpreter aborted"),
    }
    result
}

/// The end-to-end result of [`Driver::compile_and_run`]: either the
/// module never made it past semantic analysis (its issues are reported,
/// in spec.md §3's display order), or it ran to completion or a runtime
/// error.
pub enum DriverOutcome {
    /// Driver stopped after binding/constraints/solving because the
    /// module carried at least one error-severity issue.
    SemanticErrors(Vec<Issue>),
    /// The module had no entry named `entry` to run (e.g. `--emit-ir`
    /// only, or a module with no `main`).
    NoEntry,
    Ran(Result<Value, InterpError>),
}

/// Ties a [`ModuleLoader`] to a [`CompilerContext`] for the CLI's one
/// job: load a module by name, run it through [`compile_module`], then
/// [`run_entry`] if lowering produced a `main`.
pub struct Driver<L: ModuleLoader> {
    pub loader: L,
    pub ctx: CompilerContext,
}

impl<L: ModuleLoader> Driver<L> {
    pub fn new(loader: L) -> Self {
        Self { loader, ctx: CompilerContext::new() }
    }

    /// Loads `program`, compiles it, and — if lowering succeeded and the
    /// resulting unit defines `entry` — interprets it.
    pub fn compile_and_run(&mut self, program: &str, entry: &str) -> anyhow::Result<(Module, DriverOutcome)> {
        let id = self.ctx.next_module_id();
        let mut module = self.loader.load(id, program, &mut self.ctx.interner)?;
        let compiled = compile_module(&mut module, &mut self.ctx);

        if compiled.unit.is_none() {
            let issues = module.issues.in_display_order().into_iter().cloned().collect();
            return Ok((module, DriverOutcome::SemanticErrors(issues)));
        }

        let unit = compiled.unit.unwrap();
        if unit.function(entry).is_none() {
            return Ok((module, DriverOutcome::NoEntry));
        }
        let result = run_entry(&unit, entry);
        Ok((module, DriverOutcome::Ran(result)))
    }

    /// Loads and compiles `program` without running it, handing back the
    /// lowered [`Unit`] when one exists — used by `--emit-ir`.
    pub fn compile_only(&mut self, program: &str) -> anyhow::Result<(Module, CompiledModule)> {
        let id = self.ctx.next_module_id();
        let mut module = self.loader.load(id, program, &mut self.ctx.interner)?;
        let compiled = compile_module(&mut module, &mut self.ctx);
        Ok((module, compiled))
    }
}

/// Render a module's accumulated issues the way spec.md §7's
/// "still reports all accumulated issues" expects: one line per issue,
/// severity-desc/buffer/range-start order, already guaranteed by
/// [`wardc_util::IssueSet::in_display_order`].
pub fn format_issues(issues: &[Issue]) -> String {
    issues.iter().map(|i| format!("{}: {}", i.severity, i.message)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::DemoLoader;

    #[test]
    fn empty_program_runs_to_completion() {
        let mut driver = Driver::new(DemoLoader);
        let (module, outcome) = driver.compile_and_run("empty", "main").unwrap();
        assert!(!module.issues.has_errors());
        match outcome {
            DriverOutcome::Ran(Ok(_)) => {}
            _ => panic!("expected the empty program to run to completion"),
        }
    }

    #[test]
    fn let_x_program_solves_x_to_int_and_runs() {
        let mut driver = Driver::new(DemoLoader);
        let (module, outcome) = driver.compile_and_run("let-x", "main").unwrap();
        assert!(!module.issues.has_errors());
        assert!(matches!(outcome, DriverOutcome::Ran(Ok(_))));
    }

    #[test]
    fn if_else_program_runs_without_issues() {
        let mut driver = Driver::new(DemoLoader);
        let (module, outcome) = driver.compile_and_run("if-else", "main").unwrap();
        assert!(!module.issues.has_errors());
        assert!(matches!(outcome, DriverOutcome::Ran(Ok(_))));
    }

    #[test]
    fn closure_program_runs_without_issues() {
        let mut driver = Driver::new(DemoLoader);
        let (module, outcome) = driver.compile_and_run("closure", "main").unwrap();
        assert!(!module.issues.has_errors());
        assert!(matches!(outcome, DriverOutcome::Ran(Ok(_))));
    }

    #[test]
    fn unknown_program_name_is_a_driver_error_not_a_panic() {
        let mut driver = Driver::new(DemoLoader);
        assert!(driver.compile_and_run("nope", "main").is_err());
    }

    #[test]
    fn compile_only_does_not_require_an_entry_point() {
        let mut driver = Driver::new(DemoLoader);
        let (module, compiled) = driver.compile_only("let-x").unwrap();
        assert!(!module.issues.has_errors());
        assert!(compiled.unit.is_some());
    }
}
