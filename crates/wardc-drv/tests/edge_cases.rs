//! Driver-level edge cases: the parts of spec.md §5/§6/§7 that aren't
//! about any one pass's algorithm, but about how the driver glues passes
//! together (module admission, the fatal/non-fatal boundary, an unknown
//! loader request).

use wardc_drv::fixtures::DemoLoader;
use wardc_drv::{CompilerContext, Driver, DriverOutcome, ModuleLoader};

#[test]
fn module_ids_are_admitted_in_increasing_order() {
    let mut ctx = CompilerContext::new();
    let a = ctx.next_module_id();
    let b = ctx.next_module_id();
    assert_ne!(a, b);
}

#[test]
fn unknown_demo_program_is_a_driver_error_not_a_panic() {
    let mut driver = Driver::new(DemoLoader);
    let result = driver.compile_and_run("this-program-does-not-exist", "main");
    assert!(result.is_err());
}

#[test]
fn missing_entry_point_is_reported_without_running_anything() {
    // `compile_only` never requires an entry; an explicit request for an
    // entry the unit doesn't define comes back as `NoEntry`, not an error.
    let mut driver = Driver::new(DemoLoader);
    let (module, outcome) = driver.compile_and_run("empty", "not_main").unwrap();
    assert!(!module.issues.has_errors());
    assert!(matches!(outcome, DriverOutcome::NoEntry));
}

#[test]
fn compiler_context_is_shared_across_two_modules_loaded_in_sequence() {
    // spec.md §5: "the type-interning table and module map are
    // process-wide" — two modules compiled against the same
    // `CompilerContext` should intern the same builtin (e.g. `Int`) to
    // the same `TypeId`, since both fixtures declare it under the same
    // name.
    let mut ctx = CompilerContext::new();
    let mut loader = DemoLoader;

    let id_a = ctx.next_module_id();
    let mut module_a = loader.load(id_a, "let-x", &mut ctx.interner).unwrap();
    let _ = wardc_drv::compile_module(&mut module_a, &mut ctx);

    let id_b = ctx.next_module_id();
    let mut module_b = loader.load(id_b, "if-else", &mut ctx.interner).unwrap();
    let _ = wardc_drv::compile_module(&mut module_b, &mut ctx);

    assert!(!module_a.issues.has_errors());
    assert!(!module_b.issues.has_errors());
    assert_ne!(module_a.id, module_b.id);
}

#[test]
fn format_issues_is_empty_for_a_clean_compile() {
    let mut driver = Driver::new(DemoLoader);
    let (module, _) = driver.compile_only("closure").unwrap();
    let issues: Vec<_> = module.issues.in_display_order().into_iter().cloned().collect();
    assert_eq!(wardc_drv::format_issues(&issues), "");
}
