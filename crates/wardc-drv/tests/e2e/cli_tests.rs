//! Exercises the `wardc` binary the way a user would invoke it from a
//! shell, per spec.md §6's CLI surface: list the demo programs, run one,
//! dump its lowered IR, and check the exit codes an unknown program or a
//! missing entry point produce.

use assert_cmd::Command;
use predicates::prelude::*;

fn wardc() -> Command {
    Command::cargo_bin("wardc").expect("wardc binary should build")
}

#[test]
fn list_prints_every_demo_program_name() {
    wardc()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"))
        .stdout(predicate::str::contains("let-x"))
        .stdout(predicate::str::contains("if-else"))
        .stdout(predicate::str::contains("closure"));
}

#[test]
fn running_let_x_prints_the_final_value() {
    wardc().arg("let-x").assert().success().stdout(predicate::str::contains("1"));
}

#[test]
fn running_closure_prints_the_captured_value() {
    wardc().arg("closure").assert().success();
}

#[test]
fn emit_ir_prints_a_lowered_function() {
    wardc()
        .arg("let-x")
        .arg("--emit-ir")
        .assert()
        .success()
        .stdout(predicate::str::contains("fun $main"));
}

#[test]
fn unknown_program_name_exits_nonzero_with_a_message() {
    wardc()
        .arg("no-such-program")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such demo program"));
}

#[test]
fn missing_program_argument_exits_with_a_usage_hint() {
    wardc().assert().failure().stderr(predicate::str::contains("--list"));
}

#[test]
fn unknown_entry_point_is_reported_without_a_runtime_panic() {
    wardc()
        .arg("empty")
        .arg("--entry")
        .arg("not_main")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry point"));
}

#[test]
fn verbose_flag_does_not_change_the_outcome() {
    wardc().arg("if-else").arg("--verbose").assert().success();
}
