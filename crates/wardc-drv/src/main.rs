//! `wardc` — the thin CLI wrapper spec.md §6 allows around the core:
//! "No CLI surface, environment variables, or persisted state belong to
//! the core." Everything below only selects *what to run* and *how to
//! show it*; none of it is consulted by `wardc-sem`/`wardc-ir`/
//! `wardc-interp`.
//!
//! Grounded on `faxt`'s `clap` derive style and `tracing`/
//! `tracing-subscriber` setup (teacher's CLI crate; dropped as a
//! dependency per DESIGN.md, its dependency choices kept here instead).

use clap::Parser;
use wardc_drv::fixtures::DemoLoader;
use wardc_drv::{format_issues, DriverOutcome};

/// Run one of this workspace's built-in demo programs through the full
/// bind -> constrain -> solve -> lower -> interpret pipeline.
///
/// There is no concrete lexer/parser in this workspace (spec.md §1 scopes
/// it out as an external collaborator); `PROGRAM` names one of the
/// in-memory fixtures `wardc-drv::fixtures::DemoLoader` builds directly
/// with the AST arena API instead of parsing source text.
#[derive(Parser)]
#[command(name = "wardc", version, about)]
struct Cli {
    /// Which demo program to compile (see `--list` for the available names).
    program: Option<String>,

    /// List the available demo program names and exit.
    #[arg(long)]
    list: bool,

    /// Print the lowered IR (spec.md §6 textual form) instead of running it.
    #[arg(long)]
    emit_ir: bool,

    /// Name of the function to interpret once lowering succeeds.
    #[arg(long, default_value = "main")]
    entry: String,

    /// Enable verbose (`debug`-level) tracing; defaults to `RUST_LOG`
    /// when unset.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = DemoLoader;
    if cli.list {
        for name in loader.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(program) = cli.program else {
        eprintln!("error: no PROGRAM given (pass --list to see the available demo programs)");
        std::process::exit(3);
    };

    let mut driver = wardc_drv::Driver::new(loader);

    if cli.emit_ir {
        let (module, compiled) = driver.compile_only(&program)?;
        if module.issues.has_errors() {
            eprintln!("{}", format_issues(&module.issues.in_display_order().into_iter().cloned().collect::<Vec<_>>()));
            std::process::exit(1);
        }
        let unit = compiled.unit.expect("no error-severity issues implies lowering ran");
        for function in unit.functions.values() {
            println!("fun ${} :", function.name);
            print!("{}", wardc_ir::text::print_function(function));
        }
        return Ok(());
    }

    let (module, outcome) = driver.compile_and_run(&program, &cli.entry)?;
    match outcome {
        DriverOutcome::SemanticErrors(issues) => {
            eprintln!("{}", format_issues(&issues));
            std::process::exit(1);
        }
        DriverOutcome::NoEntry => {
            eprintln!("error: `{program}` defines no entry point named `{}`", cli.entry);
            std::process::exit(1);
        }
        DriverOutcome::Ran(Ok(value)) => {
            println!("{value}");
            if module.issues.has_errors() {
                eprintln!("{}", format_issues(&module.issues.in_display_order().into_iter().cloned().collect::<Vec<_>>()));
            }
        }
        DriverOutcome::Ran(Err(err)) => {
            eprintln!("runtime error: {err}");
            std::process::exit(2);
        }
    }

    Ok(())
}
