//! Fixture discovery: the flat list of annotated sources a run works through.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::HarnessError;

/// Default fixture directory, relative to the working directory.
pub const DEFAULT_TEST_ROOT: &str = "tests/test_files";

/// Default fixture extension (without the dot).
pub const DEFAULT_EXTENSION: &str = "co";

/// Finds fixtures for a conformance run.
///
/// Only files directly inside the root are considered (the equivalent of
/// `<root>/*.<ext>`); subdirectories are not descended into.
#[derive(Debug)]
pub struct FixtureDiscoverer;

impl FixtureDiscoverer {
    /// Returns true if the given path has the fixture extension.
    fn is_fixture(path: &Path, extension: &str) -> bool {
        path.extension().is_some_and(|ext| ext == extension)
    }

    /// Scans `root` for fixtures with the given extension.
    ///
    /// The returned list is sorted so reports are stable between runs. A missing root
    /// is not an error: it simply contains no fixtures.
    pub fn discover<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>, HarnessError> {
        let root = root.as_ref();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| HarnessError::Discovery {
                root: root.to_path_buf(),
                source,
            })?;
            // Follows symlinks to files, like a shell glob would.
            if !entry.path().is_file() {
                continue;
            }
            if !Self::is_fixture(entry.path(), extension) {
                continue;
            }
            files.push(entry.into_path());
        }
        files.sort();
        Ok(files)
    }
}
