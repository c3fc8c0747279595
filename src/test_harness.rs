//! Conformance Test Harness
//!
//! Drives the golden-output pipeline for every fixture found under the test root.
//!
//! # Architecture
//!
//! Each fixture moves through a fixed sequence of phases and stops at the first one
//! that produces a verdict:
//! 1. **Extraction**: read the fixture and collect its `// EXPECT:` lines
//! 2. **Compilation**: `<compiler> build <fixture> -o <artifact>`
//! 3. **Execution**: run the artifact and capture its combined output
//! 4. **Verification**: compare the trimmed output with the expected transcript
//!
//! A fixture with no expectations is skipped before anything is spawned. The artifact
//! is owned by an [`ArtifactGuard`] for the whole of phases 2 to 4, so it never
//! outlives its fixture.
//!
//! Every fixture yields exactly one [`Verdict`]. Failures are values: nothing that
//! happens to one fixture stops the suite. The run-level [`Summary`] is a reduction
//! over the per-fixture results.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use come_conformance::cli::output::ConsoleReporter;
//! use come_conformance::test_harness::{run_suite, TestConfig};
//!
//! let config = TestConfig::default();
//! let mut reporter = ConsoleReporter::stdout(termcolor::ColorChoice::Auto);
//! let report = run_suite(&config, &config.runner(), &mut reporter).unwrap();
//! std::process::exit(report.summary.exit_code());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::compiler::{artifact_path, ArtifactGuard, Compiler, DEFAULT_COMPILER};
use crate::diagnostics::{Failure, HarnessError};
use crate::discovery::{FixtureDiscoverer, DEFAULT_EXTENSION, DEFAULT_TEST_ROOT};
use crate::execution::execute;
use crate::expectation::{Expectation, DEFAULT_MARKER};
use crate::process::{ProcessRunner, SystemRunner};
use crate::verify::verify;

// =============================================================================
// CORE TYPES
// =============================================================================

/// The outcome of one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Failure),
    /// No assertions were requested, or the fixture was filtered out.
    Skipped(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Verdict::Skipped(_))
    }
}

/// A fixture paired with its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureResult {
    pub fixture: PathBuf,
    pub verdict: Verdict,
}

/// Pass/fail/skip counts for a run. Skipped fixtures count towards neither passed
/// nor failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_results(results: &[FixtureResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.record(&result.verdict);
            summary
        })
    }

    pub fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail(_) => self.failed += 1,
            Verdict::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Process exit status for the run: zero iff nothing failed.
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub results: Vec<FixtureResult>,
    pub summary: Summary,
}

/// Configuration for a conformance run.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub test_root: PathBuf,
    /// Fixture extension, without the dot.
    pub extension: String,
    pub compiler: PathBuf,
    pub marker: String,
    /// Wall-clock limit per spawned process.
    pub timeout: Option<Duration>,
    /// Case-insensitive substring a fixture's file name must contain to run.
    pub filter: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_root: PathBuf::from(DEFAULT_TEST_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
            compiler: PathBuf::from(DEFAULT_COMPILER),
            marker: DEFAULT_MARKER.to_string(),
            timeout: None,
            filter: None,
        }
    }
}

impl TestConfig {
    /// The process runner this configuration asks for.
    pub fn runner(&self) -> SystemRunner {
        SystemRunner::new(self.timeout)
    }
}

/// Receives results as the suite progresses.
pub trait SuiteReporter {
    fn no_fixtures(&mut self, root: &Path) -> io::Result<()>;
    fn fixture_started(&mut self, fixture: &Path) -> io::Result<()>;
    fn fixture_finished(&mut self, result: &FixtureResult) -> io::Result<()>;
    fn finished(&mut self, results: &[FixtureResult], summary: &Summary) -> io::Result<()>;
}

// =============================================================================
// FIXTURE PIPELINE
// =============================================================================

/// Helper for filter-based skipping.
pub fn skip_reason(fixture: &Path, filter: Option<&str>) -> Option<String> {
    let filter = filter?;
    let name = fixture
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains(&filter.to_lowercase()) {
        None
    } else {
        Some(format!("Filtered out by substring: {}", filter))
    }
}

/// Execute a single fixture through the complete pipeline.
pub fn run_fixture<R: ProcessRunner + ?Sized>(
    fixture: &Path,
    config: &TestConfig,
    runner: &R,
) -> Verdict {
    let text = match fs::read_to_string(fixture) {
        Ok(text) => text,
        Err(e) => {
            return Verdict::Fail(Failure::Unreadable {
                message: e.to_string(),
            })
        }
    };

    let expectation = Expectation::extract_with_marker(&text, &config.marker);
    if expectation.is_empty() {
        return Verdict::Skipped(format!(
            "No expected output defined in {}",
            fixture.display()
        ));
    }
    debug!(fixture = %fixture.display(), lines = expectation.len(), "extracted expectation");

    let artifact = ArtifactGuard::acquire(artifact_path(fixture));

    let compiler = Compiler::new(&config.compiler);
    if let Err(failure) = compiler.compile(runner, fixture, artifact.path()) {
        return Verdict::Fail(failure);
    }

    let actual = match execute(runner, artifact.path()) {
        Ok(actual) => actual,
        Err(failure) => return Verdict::Fail(failure),
    };

    verify(&expectation, &actual)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Discover and run every fixture, reporting as results become available.
///
/// Only run-level problems (walking the test root, writing the report) are errors;
/// per-fixture failures are recorded in the returned [`SuiteReport`].
pub fn run_suite<R, W>(
    config: &TestConfig,
    runner: &R,
    reporter: &mut W,
) -> Result<SuiteReport, HarnessError>
where
    R: ProcessRunner + ?Sized,
    W: SuiteReporter + ?Sized,
{
    let fixtures = FixtureDiscoverer::discover(&config.test_root, &config.extension)?;
    info!(root = %config.test_root.display(), count = fixtures.len(), "discovered fixtures");
    if fixtures.is_empty() {
        reporter.no_fixtures(&config.test_root)?;
    }

    let mut results = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        reporter.fixture_started(&fixture)?;
        let verdict = match skip_reason(&fixture, config.filter.as_deref()) {
            Some(reason) => Verdict::Skipped(reason),
            None => run_fixture(&fixture, config, runner),
        };
        debug!(fixture = %fixture.display(), ?verdict, "fixture finished");

        let result = FixtureResult { fixture, verdict };
        reporter.fixture_finished(&result)?;
        results.push(result);
    }

    let summary = Summary::from_results(&results);
    reporter.finished(&results, &summary)?;
    Ok(SuiteReport { results, summary })
}
