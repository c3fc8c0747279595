//! Defines the command-line arguments for the conformance runner.
//!
//! Every flag is optional and defaults to the reference layout, so invoking the
//! runner with no arguments executes the full suite.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::compiler::DEFAULT_COMPILER;
use crate::discovery::{DEFAULT_EXTENSION, DEFAULT_TEST_ROOT};
use crate::expectation::DEFAULT_MARKER;
use crate::test_harness::TestConfig;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "test_runner",
    version,
    about = "Compile every fixture with the come compiler, run it, and check its output against // EXPECT: annotations."
)]
pub struct RunnerArgs {
    /// Directory containing the fixtures.
    #[arg(long, default_value = DEFAULT_TEST_ROOT)]
    pub root: PathBuf,

    /// Path to the compiler executable.
    #[arg(long, default_value = DEFAULT_COMPILER)]
    pub compiler: PathBuf,

    /// Fixture file extension, without the dot.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Marker introducing an expected output line.
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,

    /// Kill the compiler or a test binary after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run only fixtures whose file name contains this substring (case-insensitive).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// When to colorize the report.
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    pub color: ColorArg,

    /// Print a single JSON document instead of the console report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl ColorArg {
    /// `auto` colorizes only when stdout is a terminal.
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorArg::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
            ColorArg::Auto => ColorChoice::Never,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}

impl RunnerArgs {
    pub fn to_config(&self) -> TestConfig {
        TestConfig {
            test_root: self.root.clone(),
            extension: self.extension.clone(),
            compiler: self.compiler.clone(),
            marker: self.marker.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            filter: self.filter.clone(),
        }
    }
}
