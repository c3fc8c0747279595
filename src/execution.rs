//! Runs a compiled artifact and captures its transcript.

use std::path::Path;

use tracing::debug;

use crate::diagnostics::Failure;
use crate::process::ProcessRunner;

/// Runs `artifact` with no arguments.
///
/// On exit status zero the combined output is returned with leading and trailing
/// whitespace trimmed. Anything else is a [`Failure::ExecutionError`] carrying the raw
/// output.
pub fn execute<R: ProcessRunner + ?Sized>(runner: &R, artifact: &Path) -> Result<String, Failure> {
    let result = runner.run(artifact, &[]).map_err(|e| Failure::ExecutionError {
        output: format!("failed to run {}: {}", artifact.display(), e),
    })?;

    if !result.success {
        debug!(artifact = %artifact.display(), code = ?result.code, "execution failed");
        return Err(Failure::ExecutionError {
            output: result.diagnostic(),
        });
    }
    Ok(result.output.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::io;

    use super::*;
    use crate::process::ProcessOutput;

    struct Canned(io::Result<ProcessOutput>);

    impl ProcessRunner for Canned {
        fn run(&self, _program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput> {
            assert!(args.is_empty(), "artifacts take no arguments");
            match &self.0 {
                Ok(out) => Ok(out.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn exited(code: i32, output: &str) -> Canned {
        Canned(Ok(ProcessOutput {
            code: Some(code),
            success: code == 0,
            output: output.to_string(),
            timed_out: false,
        }))
    }

    #[test]
    fn test_success_trims_outer_whitespace_only() {
        let runner = exited(0, "\n  3\n\nhello  \n");
        assert_eq!(execute(&runner, Path::new("prog")), Ok("3\n\nhello".to_string()));
    }

    #[test]
    fn test_non_zero_exit_keeps_untrimmed_output() {
        let runner = exited(139, "segfault at 0x0\n");
        assert_eq!(
            execute(&runner, Path::new("prog")),
            Err(Failure::ExecutionError {
                output: "segfault at 0x0\n".to_string()
            })
        );
    }

    #[test]
    fn test_spawn_error_becomes_execution_error() {
        let runner = Canned(Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        let Err(Failure::ExecutionError { output }) = execute(&runner, Path::new("prog")) else {
            panic!("expected an execution error");
        };
        assert!(output.contains("failed to run prog"));
        assert!(output.contains("denied"));
    }
}
