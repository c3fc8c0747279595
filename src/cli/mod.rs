//! The conformance runner's command-line interface.
//!
//! Parses [`args::RunnerArgs`], runs the suite with the selected reporter, and maps
//! the result onto a process exit code.

use std::io;

use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::args::RunnerArgs;
use crate::cli::output::{ConsoleReporter, JsonReporter};
use crate::test_harness::run_suite;

pub mod args;
pub mod output;

const DEFAULT_LOG_FILTER: &str = "come_conformance=warn";

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // stdout carries the report, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

/// The main entry point for the CLI. Returns the exit code for the run.
pub fn run() -> Result<i32> {
    let args = RunnerArgs::parse();
    let config = args.to_config();
    let runner = config.runner();

    let report = if args.json {
        let mut reporter = JsonReporter::new(io::stdout().lock());
        run_suite(&config, &runner, &mut reporter)?
    } else {
        let mut reporter = ConsoleReporter::stdout(args.color.choice());
        run_suite(&config, &runner, &mut reporter)?
    };

    Ok(report.summary.exit_code())
}
