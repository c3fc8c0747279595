//! Error types for the conformance runner.
//!
//! Two layers of failure exist and they never mix:
//!
//! - [`Failure`] is a per-fixture outcome. It is a plain value carried inside a
//!   [`Verdict`](crate::test_harness::Verdict) and never aborts the suite.
//! - [`HarnessError`] is a run-level error (the test root cannot be walked, the report
//!   cannot be written). It stops the run and is rendered through `miette`.

use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Why a single fixture failed.
///
/// Diagnostic payloads (`output`) are captured from the collaborator process verbatim
/// and are never interpreted by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Failure {
    /// The compiler executable is not where the configuration says it is.
    MissingCompiler { path: PathBuf },
    /// The compiler exited non-zero, could not be spawned, or timed out.
    CompileError { output: String },
    /// The compiled artifact exited non-zero, could not be spawned, or timed out.
    ExecutionError { output: String },
    /// Both transcripts, already in their compared form.
    OutputMismatch { expected: String, actual: String },
    /// The fixture could not be read as UTF-8 text.
    Unreadable { message: String },
}

impl Failure {
    /// Short label used in the `[FAIL]` status line.
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::MissingCompiler { .. } => FailureKind::MissingCompiler,
            Failure::CompileError { .. } => FailureKind::CompileError,
            Failure::ExecutionError { .. } => FailureKind::ExecutionError,
            Failure::OutputMismatch { .. } => FailureKind::OutputMismatch,
            Failure::Unreadable { .. } => FailureKind::Unreadable,
        }
    }

    /// One-line human description, without the captured payload.
    pub fn headline(&self) -> String {
        match self {
            Failure::MissingCompiler { path } => {
                format!("Compiler not found at {}", path.display())
            }
            Failure::CompileError { .. } => "Compilation failed".to_string(),
            Failure::ExecutionError { .. } => "Execution failed".to_string(),
            Failure::OutputMismatch { .. } => "Output mismatch".to_string(),
            Failure::Unreadable { message } => format!("Cannot read fixture: {}", message),
        }
    }
}

/// Type-safe classification of [`Failure`], for matching in tests and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingCompiler,
    CompileError,
    ExecutionError,
    OutputMismatch,
    Unreadable,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingCompiler => "MissingCompiler",
            FailureKind::CompileError => "CompileError",
            FailureKind::ExecutionError => "ExecutionError",
            FailureKind::OutputMismatch => "OutputMismatch",
            FailureKind::Unreadable => "Unreadable",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run-level errors. Anything that reaches `main` as one of these exits with status 2.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to walk test directory {}: {source}", .root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to write report: {source}")]
    Report {
        #[source]
        source: std::io::Error,
    },
}

impl Diagnostic for HarnessError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            HarnessError::Discovery { .. } => "conformance::discovery",
            HarnessError::Report { .. } => "conformance::report",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            HarnessError::Discovery { .. } => Some(Box::new(
                "check that --root points at a readable directory of fixtures",
            )),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(source: std::io::Error) -> Self {
        HarnessError::Report { source }
    }
}
