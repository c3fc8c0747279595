//! # Inline Expectation Extraction
//!
//! A fixture declares the output it expects through marker comments, one expected
//! line per marker:
//!
//! ```text
//! print(1 + 2);      // EXPECT: 3
//! print("hello");    // EXPECT: hello
//! ```
//!
//! Extraction is a pure function over the fixture text. It never touches the
//! filesystem, so it can be exercised against in-memory strings.

/// The marker used by the reference fixtures.
pub const DEFAULT_MARKER: &str = "// EXPECT:";

/// The ordered expected transcript of a fixture.
///
/// Entry order is file order and is significant: entry `n` is line `n` of the
/// program's expected output. An empty expectation means no assertions were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    lines: Vec<String>,
}

impl Expectation {
    /// Extracts the expectation using [`DEFAULT_MARKER`].
    pub fn extract(text: &str) -> Self {
        Self::extract_with_marker(text, DEFAULT_MARKER)
    }

    /// Extracts the expectation using a custom marker token.
    ///
    /// Every line containing `marker` contributes the text after its first occurrence,
    /// trimmed. Lines without the marker are ignored.
    pub fn extract_with_marker(text: &str, marker: &str) -> Self {
        let lines = text
            .lines()
            .filter_map(|line| line.split_once(marker))
            .map(|(_, rest)| rest.trim().to_string())
            .collect();
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The canonical expected transcript: entries joined by a single `\n`.
    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<Vec<String>> for Expectation {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}
