// Conformance runner: compiles every fixture, runs it, and checks its output.
// Usage: cargo run --bin test_runner [-- --filter <substr>]

use std::process;

use come_conformance::cli;

fn main() {
    cli::init_logging();
    match cli::run() {
        Ok(code) => process::exit(code),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(2);
        }
    }
}
