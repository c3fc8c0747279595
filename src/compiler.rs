//! Compiler invocation and artifact lifetime.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::diagnostics::Failure;
use crate::process::ProcessRunner;

/// Default location of the compiler, relative to the working directory.
pub const DEFAULT_COMPILER: &str = "./build/come";

/// Where the compiled binary for `fixture` is written: the fixture path without its
/// extension, next to the fixture.
pub fn artifact_path(fixture: &Path) -> PathBuf {
    let artifact = fixture.with_extension("");
    // A bare file name would be looked up on PATH when executed.
    if artifact.parent().is_some_and(|p| p.as_os_str().is_empty()) {
        Path::new(".").join(artifact)
    } else {
        artifact
    }
}

/// The external compiler executable.
#[derive(Debug, Clone)]
pub struct Compiler {
    path: PathBuf,
}

impl Compiler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `<compiler> build <fixture> -o <artifact>`.
    ///
    /// Fails with [`Failure::MissingCompiler`] without spawning anything when the
    /// compiler does not exist. Any other unsuccessful outcome is a
    /// [`Failure::CompileError`] carrying the compiler's combined output.
    pub fn compile<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        fixture: &Path,
        artifact: &Path,
    ) -> Result<(), Failure> {
        if !self.path.exists() {
            return Err(Failure::MissingCompiler {
                path: self.path.clone(),
            });
        }

        let args = [
            OsStr::new("build"),
            fixture.as_os_str(),
            OsStr::new("-o"),
            artifact.as_os_str(),
        ];
        let result = runner.run(&self.path, &args).map_err(|e| Failure::CompileError {
            output: format!("failed to run compiler {}: {}", self.path.display(), e),
        })?;

        if result.success {
            debug!(fixture = %fixture.display(), artifact = %artifact.display(), "compiled");
            Ok(())
        } else {
            debug!(fixture = %fixture.display(), code = ?result.code, "compilation failed");
            Err(Failure::CompileError {
                output: result.diagnostic(),
            })
        }
    }
}

/// Owns the artifact path for the duration of one fixture.
///
/// Acquiring removes any stale file left at the path; dropping removes whatever the
/// compiler produced. Cleanup runs on every exit path, including unwinding.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    pub fn acquire(path: PathBuf) -> Self {
        remove_if_present(&path);
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        remove_if_present(&self.path);
    }
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(artifact = %path.display(), "removed artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(artifact = %path.display(), error = %e, "failed to remove artifact"),
    }
}
