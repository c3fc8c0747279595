//! Golden-output conformance runner for the come compiler.
//!
//! Fixtures under `tests/test_files/*.co` carry their expected output inline as
//! `// EXPECT:` comments. The runner compiles each one with `./build/come`, runs the
//! resulting binary, and compares what it printed with what the fixture expects.

pub use crate::diagnostics::{Failure, FailureKind, HarnessError};
pub use crate::test_harness::{run_fixture, run_suite, Summary, TestConfig, Verdict};

pub mod cli;
pub mod compiler;
pub mod diagnostics;
pub mod discovery;
pub mod execution;
pub mod expectation;
pub mod process;
pub mod test_harness;
pub mod verify;
