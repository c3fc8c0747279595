//! Transcript comparison.

use crate::diagnostics::Failure;
use crate::expectation::Expectation;
use crate::test_harness::Verdict;

/// Compares the expected transcript against the already-trimmed actual transcript.
///
/// The comparison is exact: no normalization of internal whitespace, line endings,
/// or blank lines.
pub fn verify(expectation: &Expectation, actual: &str) -> Verdict {
    let expected = expectation.transcript();
    if expected == actual {
        Verdict::Pass
    } else {
        Verdict::Fail(Failure::OutputMismatch {
            expected,
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect(lines: &[&str]) -> Expectation {
        Expectation::from(lines.iter().map(|l| l.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_matching_transcript_passes() {
        assert_eq!(verify(&expect(&["3", "hello"]), "3\nhello"), Verdict::Pass);
    }

    #[test]
    fn test_mismatch_surfaces_both_transcripts() {
        assert_eq!(
            verify(&expect(&["42"]), "41"),
            Verdict::Fail(Failure::OutputMismatch {
                expected: "42".to_string(),
                actual: "41".to_string(),
            })
        );
    }

    #[test]
    fn test_line_endings_are_not_normalized() {
        assert!(matches!(
            verify(&expect(&["a", "b"]), "a\r\nb"),
            Verdict::Fail(Failure::OutputMismatch { .. })
        ));
    }

    #[test]
    fn test_internal_whitespace_is_significant() {
        assert!(matches!(
            verify(&expect(&["1 2"]), "1  2"),
            Verdict::Fail(Failure::OutputMismatch { .. })
        ));
    }

    #[test]
    fn test_extra_output_line_fails() {
        assert!(matches!(
            verify(&expect(&["1"]), "1\n2"),
            Verdict::Fail(Failure::OutputMismatch { .. })
        ));
    }
}
