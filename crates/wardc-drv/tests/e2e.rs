//! Black-box entry point for the `wardc` binary's end-to-end tests —
//! spawns the compiled binary itself via `assert_cmd` rather than calling
//! into `wardc-drv` as a library (that's what `pipeline_integration.rs`
//! and `edge_cases.rs` already cover).

#[path = "e2e/cli_tests.rs"]
mod cli_tests;
