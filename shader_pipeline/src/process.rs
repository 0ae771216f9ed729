use std::io::{self, Read};
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::log;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failure to run an external tool to completion.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The binary failed to spawn because it's not installed or not in PATH
    #[error("`{program}` not found: {source}")]
    NotFound { program: String, source: io::Error },
    #[error("failed to launch `{program}`: {source}")]
    Launch { program: String, source: io::Error },
    #[error("`{program}` timed out after {}s", .timeout.as_secs_f32())]
    Timeout { program: String, timeout: Duration },
    /// An I/O error occurred while waiting on the process or its pipes
    #[error("i/o error communicating with `{program}`: {source}")]
    Io { program: String, source: io::Error },
}

/// Runs `cmd` and collects its output, killing it once `timeout` elapses.
///
/// The deadline covers both the process exit and draining its pipes, so a
/// background process left holding stdout or stderr cannot stall the call.
/// Any exit status counts as completion; callers decide what a non-zero
/// status means.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<Output, ToolError> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ToolError::NotFound {
            program: program.clone(),
            source,
        },
        _ => ToolError::Launch {
            program: program.clone(),
            source,
        },
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let io_error = |source| ToolError::Io {
        program: program.clone(),
        source,
    };

    let deadline = Instant::now() + timeout;
    let timed_out = || ToolError::Timeout {
        program: program.clone(),
        timeout,
    };

    let status = loop {
        if let Some(status) = child.try_wait().map_err(io_error)? {
            break status;
        }

        if Instant::now() >= deadline {
            kill(&mut child);
            // The reader threads are left detached: a grandchild may still
            // hold the pipes open.
            return Err(timed_out());
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(&stdout, deadline).ok_or_else(timed_out)?;
    let stderr = collect(&stderr, deadline).ok_or_else(timed_out)?;

    Ok(Output {
        status,
        stdout: stdout.map_err(io_error)?,
        stderr: stderr.map_err(io_error)?,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let result = pipe.read_to_end(&mut buf).map(|_| buf);
                // The receiver is gone once the call has timed out.
                let _ = tx.send(result);
            });
        }
        None => {
            let _ = tx.send(Ok(Vec::new()));
        }
    }
    rx
}

/// Waits for a pipe's contents until `deadline`; `None` means it passed.
fn collect(
    reader: &Receiver<io::Result<Vec<u8>>>,
    deadline: Instant,
) -> Option<io::Result<Vec<u8>>> {
    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => {
            Some(Err(io::Error::other("pipe reader thread panicked")))
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(err) = child.kill() {
        log::debug!("failed to kill process {}: {err}", child.id());
    }
    // Reap it so no zombie outlives the call.
    let _ = child.wait();
}
