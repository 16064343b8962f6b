//! Full bind -> constraints -> solve -> lower -> interpret pipeline,
//! exercised through the public `Driver`/`ModuleLoader` API against every
//! fixture `wardc-drv::fixtures::DemoLoader` ships (spec.md §8's
//! concrete scenarios 1, 5 and 6).

use wardc_drv::fixtures::DemoLoader;
use wardc_drv::{Driver, DriverOutcome};
use wardc_ir::Instr;

#[test]
fn empty_main_lowers_to_a_single_return_and_runs() {
    let mut driver = Driver::new(DemoLoader);
    let (module, compiled) = driver.compile_only("empty").unwrap();
    assert!(!module.issues.has_errors());
    let unit = compiled.unit.expect("no issues means lowering ran");
    let main = unit.function("main").expect("main lowered");
    let entry = main.block(&main.entry).expect("entry block");
    assert_eq!(entry.instructions.len(), 1);
    assert!(matches!(entry.instructions[0], Instr::Return { value: None }));
}

#[test]
fn let_x_one_lowers_to_make_ref_then_copy() {
    // spec.md §8 scenario 1: "IR contains `make_ref Int` then `copy
    // <int-1> -> %x`".
    let mut driver = Driver::new(DemoLoader);
    let (module, compiled) = driver.compile_only("let-x").unwrap();
    assert!(!module.issues.has_errors(), "unexpected issues: {:?}", module.issues.in_display_order());
    let unit = compiled.unit.expect("no issues means lowering ran");
    let main = unit.function("main").expect("main lowered");
    let entry = main.block(&main.entry).expect("entry block");
    assert!(matches!(entry.instructions.first(), Some(Instr::MakeRef { .. })));
    assert!(matches!(entry.instructions.get(1), Some(Instr::Assign { .. })));
}

#[test]
fn if_else_lowers_to_branch_and_two_jumps() {
    let mut driver = Driver::new(DemoLoader);
    let (module, compiled) = driver.compile_only("if-else").unwrap();
    assert!(!module.issues.has_errors(), "unexpected issues: {:?}", module.issues.in_display_order());
    let unit = compiled.unit.expect("no issues means lowering ran");
    let main = unit.function("main").expect("main lowered");

    let mut branches = 0;
    let mut jumps = 0;
    for block in main.blocks.values() {
        for instr in &block.instructions {
            match instr {
                Instr::Branch { .. } => branches += 1,
                Instr::Jump { .. } => jumps += 1,
                _ => {}
            }
        }
    }
    assert_eq!(branches, 1, "exactly one branch terminator for the if");
    assert_eq!(jumps, 2, "both arms jump to the merge block");
    // then/else/merge plus the entry block that holds the branch itself.
    assert!(main.blocks.len() >= 4);
}

#[test]
fn closure_capture_emits_a_lambda_function_and_a_partial_apply() {
    let mut driver = Driver::new(DemoLoader);
    let (module, compiled) = driver.compile_only("closure").unwrap();
    assert!(!module.issues.has_errors(), "unexpected issues: {:?}", module.issues.in_display_order());
    let unit = compiled.unit.expect("no issues means lowering ran");

    let main = unit.function("main").expect("main lowered");
    let entry = main.block(&main.entry).expect("entry block");
    assert!(
        entry.instructions.iter().any(|i| matches!(i, Instr::PartialApply { captured, .. } if !captured.is_empty())),
        "expected a partial_apply capturing the outer `k`"
    );

    let lambda_name = format!("{}$lambda1", main.name);
    assert!(unit.function(&lambda_name).is_some(), "the lambda body should lower to its own function");
}

#[test]
fn every_demo_program_runs_to_completion_through_compile_and_run() {
    for name in DemoLoader.names() {
        let mut driver = Driver::new(DemoLoader);
        let (module, outcome) = driver.compile_and_run(name, "main").unwrap();
        assert!(!module.issues.has_errors(), "{name}: unexpected issues: {:?}", module.issues.in_display_order());
        match outcome {
            DriverOutcome::Ran(Ok(_)) => {}
            DriverOutcome::Ran(Err(err)) => panic!("{name}: runtime error: {err}"),
            DriverOutcome::SemanticErrors(issues) => panic!("{name}: semantic errors: {issues:?}"),
            DriverOutcome::NoEntry => panic!("{name}: no `main` entry point"),
        }
    }
}
