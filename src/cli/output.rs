//! Handles all user-facing output for the runner.
//!
//! Two [`SuiteReporter`]s live here: the line-oriented console report (colorized
//! status tags, captured diagnostics, and a line diff for mismatches) and a JSON
//! document for tooling. Neither affects verdicts or the exit code.

use std::io::{self, Write};
use std::path::Path;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::Failure;
use crate::test_harness::{FixtureResult, SuiteReporter, Summary, Verdict};

// ============================================================================
// CONSOLE REPORT
// ============================================================================

/// Writes the human-readable report.
pub struct ConsoleReporter<W: WriteColor> {
    out: W,
}

impl ConsoleReporter<StandardStream> {
    pub fn stdout(choice: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn tag(&mut self, label: &str, color: Color) -> io::Result<()> {
        write!(self.out, "  ")?;
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.out, "[{}]", label)?;
        self.out.reset()
    }

    fn failure(&mut self, failure: &Failure) -> io::Result<()> {
        self.tag("FAIL", Color::Red)?;
        match failure {
            Failure::CompileError { output } | Failure::ExecutionError { output } => {
                writeln!(self.out, " {}:", failure.headline())?;
                write!(self.out, "{}", output)?;
                if !output.is_empty() && !output.ends_with('\n') {
                    writeln!(self.out)?;
                }
                Ok(())
            }
            Failure::OutputMismatch { expected, actual } => {
                writeln!(self.out, " {}", failure.headline())?;
                writeln!(self.out, "    Expected:\n{}", expected)?;
                writeln!(self.out, "    Got:\n{}", actual)?;
                writeln!(self.out, "    Diff:")?;
                let changeset = Changeset::new(expected, actual, "\n");
                print_diff(&mut self.out, &changeset.diffs)
            }
            Failure::MissingCompiler { .. } | Failure::Unreadable { .. } => {
                writeln!(self.out, " {}", failure.headline())
            }
        }
    }
}

impl<W: WriteColor> SuiteReporter for ConsoleReporter<W> {
    fn no_fixtures(&mut self, root: &Path) -> io::Result<()> {
        writeln!(self.out, "No test files found in {}", root.display())
    }

    fn fixture_started(&mut self, fixture: &Path) -> io::Result<()> {
        writeln!(self.out, "Testing {}...", fixture.display())
    }

    fn fixture_finished(&mut self, result: &FixtureResult) -> io::Result<()> {
        match &result.verdict {
            Verdict::Pass => {
                self.tag("PASS", Color::Green)?;
                writeln!(self.out)
            }
            Verdict::Skipped(reason) => {
                self.tag("SKIP", Color::Yellow)?;
                writeln!(self.out, " {}", reason)
            }
            Verdict::Fail(failure) => self.failure(failure),
        }
    }

    fn finished(&mut self, results: &[FixtureResult], summary: &Summary) -> io::Result<()> {
        if results.is_empty() {
            return self.out.flush();
        }
        writeln!(
            self.out,
            "\nSummary: {} passed, {} failed, {} skipped",
            summary.passed, summary.failed, summary.skipped
        )?;
        self.out.flush()
    }
}

// ============================================================================
// JSON REPORT
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    results: Vec<JsonFixture<'a>>,
    summary: &'a Summary,
}

#[derive(Serialize)]
struct JsonFixture<'a> {
    fixture: &'a Path,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(flatten)]
    failure: Option<&'a Failure>,
}

impl<'a> From<&'a FixtureResult> for JsonFixture<'a> {
    fn from(result: &'a FixtureResult) -> Self {
        let (status, message, failure) = match &result.verdict {
            Verdict::Pass => ("pass", None, None),
            Verdict::Skipped(reason) => ("skip", Some(reason.as_str()), None),
            Verdict::Fail(failure) => ("fail", None, Some(failure)),
        };
        Self {
            fixture: &result.fixture,
            status,
            message,
            failure,
        }
    }
}

/// Writes one JSON document once the suite has finished.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SuiteReporter for JsonReporter<W> {
    fn no_fixtures(&mut self, _root: &Path) -> io::Result<()> {
        Ok(())
    }

    fn fixture_started(&mut self, _fixture: &Path) -> io::Result<()> {
        Ok(())
    }

    fn fixture_finished(&mut self, _result: &FixtureResult) -> io::Result<()> {
        Ok(())
    }

    fn finished(&mut self, results: &[FixtureResult], summary: &Summary) -> io::Result<()> {
        let report = JsonReport {
            results: results.iter().map(JsonFixture::from).collect(),
            summary,
        };
        serde_json::to_writer_pretty(&mut self.out, &report)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                for line in x.split('\n') {
                    writeln!(out, "     {}", line)?;
                }
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in x.split('\n') {
                    writeln!(out, "    +{}", line)?;
                }
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in x.split('\n') {
                    writeln!(out, "    -{}", line)?;
                }
            }
        }
    }
    out.reset()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use termcolor::Buffer;

    use super::*;

    fn result(name: &str, verdict: Verdict) -> FixtureResult {
        FixtureResult {
            fixture: PathBuf::from(name),
            verdict,
        }
    }

    fn render(results: &[FixtureResult]) -> String {
        let mut reporter = ConsoleReporter::new(Buffer::no_color());
        for r in results {
            reporter.fixture_started(&r.fixture).unwrap();
            reporter.fixture_finished(r).unwrap();
        }
        let summary = Summary::from_results(results);
        reporter.finished(results, &summary).unwrap();
        String::from_utf8(reporter.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn test_pass_and_skip_lines() {
        let text = render(&[
            result("t/a.co", Verdict::Pass),
            result("t/b.co", Verdict::Skipped("No expected output defined in t/b.co".into())),
        ]);
        assert_eq!(
            text,
            "Testing t/a.co...\n  [PASS]\nTesting t/b.co...\n  [SKIP] No expected output defined in t/b.co\n\nSummary: 1 passed, 0 failed, 1 skipped\n"
        );
    }

    #[test]
    fn test_mismatch_shows_both_transcripts_and_diff() {
        let text = render(&[result(
            "t/answer.co",
            Verdict::Fail(Failure::OutputMismatch {
                expected: "42".into(),
                actual: "41".into(),
            }),
        )]);
        assert!(text.contains("  [FAIL] Output mismatch\n"));
        assert!(text.contains("    Expected:\n42\n"));
        assert!(text.contains("    Got:\n41\n"));
        assert!(text.contains("    -42\n"));
        assert!(text.contains("    +41\n"));
        assert!(text.ends_with("Summary: 0 passed, 1 failed, 0 skipped\n"));
    }

    #[test]
    fn test_compile_error_output_is_verbatim() {
        let text = render(&[result(
            "t/bad.co",
            Verdict::Fail(Failure::CompileError {
                output: "t/bad.co:3:1: error: expected expression".into(),
            }),
        )]);
        assert!(text.contains(
            "  [FAIL] Compilation failed:\nt/bad.co:3:1: error: expected expression\n"
        ));
    }

    #[test]
    fn test_missing_compiler_line() {
        let text = render(&[result(
            "t/a.co",
            Verdict::Fail(Failure::MissingCompiler {
                path: PathBuf::from("./build/come"),
            }),
        )]);
        assert!(text.contains("  [FAIL] Compiler not found at ./build/come\n"));
    }

    #[test]
    fn test_empty_suite_prints_no_summary() {
        let mut reporter = ConsoleReporter::new(Buffer::no_color());
        reporter.no_fixtures(Path::new("tests/test_files")).unwrap();
        reporter.finished(&[], &Summary::default()).unwrap();
        let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
        assert_eq!(text, "No test files found in tests/test_files\n");
    }

    #[test]
    fn test_json_report_shape() {
        let results = [
            result("t/a.co", Verdict::Pass),
            result("t/b.co", Verdict::Skipped("filtered".into())),
            result(
                "t/c.co",
                Verdict::Fail(Failure::ExecutionError {
                    output: "boom".into(),
                }),
            ),
        ];
        let mut reporter = JsonReporter::new(Vec::new());
        reporter
            .finished(&results, &Summary::from_results(&results))
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        assert_eq!(json["summary"]["passed"], 1);
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["summary"]["skipped"], 1);
        assert_eq!(json["results"][0]["status"], "pass");
        assert!(json["results"][0].get("reason").is_none());
        assert!(json["results"][0].get("message").is_none());
        assert_eq!(json["results"][1]["message"], "filtered");
        assert_eq!(json["results"][2]["status"], "fail");
        assert_eq!(json["results"][2]["reason"], "execution_error");
        assert_eq!(json["results"][2]["output"], "boom");
    }
}
