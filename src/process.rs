//! Subprocess capability shared by the compiler and execution invokers.
//!
//! Both invokers only ever need "run this executable with these arguments and give me
//! its exit status and combined output". That single capability lives behind
//! [`ProcessRunner`] so a different strategy (a fake in tests, a sandbox) can be swapped
//! in without touching the pipeline.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// How long to keep reading after a timeout kill before giving up on the pipe.
const DRAIN_GRACE: Duration = Duration::from_millis(250);
const SPAWN_RETRIES: u64 = 5;
// ETXTBSY has the same value on Linux and the BSDs.
const ETXTBSY: i32 = 26;

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// True iff the process exited with status zero before any timeout.
    pub success: bool,
    /// Stdout and stderr as written through one shared pipe, decoded lossily.
    pub output: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Text to surface when the process did not succeed.
    pub fn diagnostic(&self) -> String {
        if self.timed_out {
            let mut text = self.output.clone();
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str("(process killed after timeout)");
            return text;
        }
        self.output.clone()
    }
}

/// Runs an executable to completion and captures its combined output.
pub trait ProcessRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput>;
}

/// The real [`ProcessRunner`]: spawns a child process on the local machine.
///
/// With a timeout set, the child is started in its own process group and the whole
/// group is killed when the limit is reached, so background processes it started
/// cannot keep the run waiting on the output pipe.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Wall-clock limit per process. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn wait(&self, child: &mut Child) -> io::Result<(ExitStatus, bool)> {
        let Some(limit) = self.timeout else {
            return Ok((child.wait()?, false));
        };
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok((status, false));
            }
            if Instant::now() >= deadline {
                kill_tree(child);
                let status = child.wait()?;
                return Ok((status, true));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> io::Result<ProcessOutput> {
        debug!(program = %program.display(), ?args, "spawning process");

        let (reader, writer) = io::pipe()?;
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            if self.timeout.is_some() {
                own_process_group(&mut command);
            }
            spawn_retrying(&mut command)?
            // `command` drops here, closing our copies of the write end so the
            // reader sees EOF once the child exits.
        };

        let captured = Arc::new(Mutex::new(Vec::new()));
        let drained = spawn_collector(reader, Arc::clone(&captured));

        let (status, timed_out) = match self.wait(&mut child) {
            Ok(waited) => waited,
            Err(e) => {
                kill_tree(&mut child);
                let _ = child.wait();
                return Err(e);
            }
        };

        if timed_out {
            // Something outside the group may still hold the pipe open; keep
            // whatever has arrived and stop waiting for EOF.
            match drained.recv_timeout(DRAIN_GRACE) {
                Ok(result) => result?,
                Err(_) => warn!(
                    program = %program.display(),
                    "output pipe still open after timeout, keeping partial output"
                ),
            }
        } else {
            drained
                .recv()
                .map_err(|_| io::Error::other("output collector thread panicked"))??;
        }

        let bytes = std::mem::take(&mut *captured.lock().unwrap_or_else(PoisonError::into_inner));
        let output = ProcessOutput {
            code: status.code(),
            success: status.success() && !timed_out,
            output: String::from_utf8_lossy(&bytes).into_owned(),
            timed_out,
        };
        trace!(
            program = %program.display(),
            code = ?output.code,
            timed_out,
            bytes = bytes.len(),
            "process finished"
        );
        Ok(output)
    }
}

/// Reads the pipe to EOF on a background thread, appending into `sink` as bytes
/// arrive. The receiver yields once EOF is reached or the read fails.
fn spawn_collector(mut reader: io::PipeReader, sink: Arc<Mutex<Vec<u8>>>) -> Receiver<io::Result<()>> {
    let (done, drained) = mpsc::channel();
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        let result = loop {
            match reader.read(&mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => sink
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        let _ = done.send(result);
    });
    drained
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Kills the child and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pgid) = i32::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions. A negative pid targets the
    // group the child leads; if there is no such group the call just fails.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

fn spawn_retrying(command: &mut Command) -> io::Result<Child> {
    let mut attempt = 0;
    loop {
        match command.spawn() {
            // A freshly written executable can still be open for writing in a
            // concurrently forked child.
            Err(e) if e.raw_os_error() == Some(ETXTBSY) && attempt < SPAWN_RETRIES => {
                attempt += 1;
                debug!(attempt, "executable busy, retrying spawn");
                thread::sleep(Duration::from_millis(10 * attempt));
            }
            result => return result,
        }
    }
}
