//! Timed I/O reader — one deadline-bounded stdout line, stderr drained
//! concurrently.
//!
//! The stdout read and the stderr drain are two independently scheduled
//! tasks. Reading them sequentially with unbounded blocking reads would
//! deadlock as soon as the child fills its error pipe while the parent
//! blocks on output (the classic two-pipe deadlock).
//!
//! On timeout the read future is dropped and the line it was waiting for
//! is abandoned; the owning session must treat the process as suspect and
//! restart it before the next persistent exchange.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Background task that continuously drains the child's stderr pipe into a
/// shared buffer, so the pipe can never fill up and block the child.
pub(crate) struct StderrDrain {
    buffer: Arc<Mutex<String>>,
    handle: JoinHandle<()>,
}

impl StderrDrain {
    /// Spawn the drain task for a freshly launched child.
    pub fn spawn(stderr: ChildStderr) -> Self {
        let buffer = Arc::new(Mutex::new(String::new()));
        let task_buffer = Arc::clone(&buffer);

        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!("tool-server stderr: {}", line);
                // std Mutex: held only for the append, no await inside
                let mut buf = task_buffer.lock().unwrap_or_else(|e| e.into_inner());
                buf.push_str(&line);
                buf.push('\n');
            }
        });

        Self { buffer, handle }
    }

    /// Everything the child has written to stderr so far.
    pub fn snapshot(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stop draining. The task also ends on its own at pipe EOF.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for StderrDrain {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read one line from the child's stdout, bounded by `timeout`.
///
/// Returns the line without its trailing newline, or an empty string when
/// the deadline passes, the stream hits EOF, or the read fails — callers
/// distinguish those through the stderr snapshot and process state, not
/// through a panic or error here.
pub(crate) async fn read_response_line(
    stdout: &mut BufReader<ChildStdout>,
    timeout: Duration,
) -> String {
    let mut line = String::new();
    match tokio::time::timeout(timeout, stdout.read_line(&mut line)).await {
        Ok(Ok(0)) => {
            debug!("tool-server closed stdout before responding");
            String::new()
        }
        Ok(Ok(_)) => line.trim_end_matches(['\r', '\n']).to_string(),
        Ok(Err(e)) => {
            warn!("read from tool-server stdout failed: {}", e);
            String::new()
        }
        Err(_) => {
            warn!("no response from tool-server within {:?}", timeout);
            String::new()
        }
    }
}

/// One exchange's worth of reading: the response line (possibly empty) and
/// the stderr text collected so far.
pub(crate) async fn read_exchange(
    stdout: &mut BufReader<ChildStdout>,
    stderr: &StderrDrain,
    timeout: Duration,
) -> (String, String) {
    let line = read_response_line(stdout, timeout).await;
    (line, stderr.snapshot())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::server::command::ServerCommand;
    use crate::server::launcher;
    use std::time::Instant;

    fn shell(script: &str) -> ServerCommand {
        ServerCommand::new("sh").with_arg("-c").with_arg(script)
    }

    #[tokio::test]
    async fn reads_one_line() {
        let mut launched = launcher::spawn(&shell("echo hello")).unwrap();
        let line = read_response_line(&mut launched.stdout, Duration::from_secs(5)).await;
        assert_eq!(line, "hello");
    }

    #[tokio::test]
    async fn timeout_returns_empty_without_hanging() {
        let mut launched = launcher::spawn(&shell("sleep 30")).unwrap();

        let start = Instant::now();
        let line = read_response_line(&mut launched.stdout, Duration::from_millis(200)).await;
        let elapsed = start.elapsed();

        assert_eq!(line, "");
        // Small scheduling slack on top of the 200ms deadline
        assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);

        let _ = launched.child.kill().await;
    }

    #[tokio::test]
    async fn eof_before_any_line_is_empty() {
        let mut launched = launcher::spawn(&shell("exit 0")).unwrap();
        let line = read_response_line(&mut launched.stdout, Duration::from_secs(5)).await;
        assert_eq!(line, "");
    }

    #[tokio::test]
    async fn stderr_drain_prevents_pipe_deadlock() {
        // Write well past the OS pipe buffer on stderr before answering on
        // stdout. Without the concurrent drain the child would block on a
        // full stderr pipe and the stdout read would never complete.
        let script = "i=0; while [ $i -lt 10000 ]; do echo some-noisy-diagnostic-line >&2; i=$((i+1)); done; echo done";
        let launched = launcher::spawn(&shell(script)).unwrap();
        let mut stdout = launched.stdout;
        let drain = StderrDrain::spawn(launched.stderr);

        let (line, _) = read_exchange(&mut stdout, &drain, Duration::from_secs(10)).await;
        assert_eq!(line, "done");

        // Give the drain a beat to finish consuming the pipe
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(drain.snapshot().contains("some-noisy-diagnostic-line"));
    }

    #[tokio::test]
    async fn snapshot_reflects_stderr_output() {
        let launched = launcher::spawn(&shell("echo warning-text >&2; sleep 5")).unwrap();
        let drain = StderrDrain::spawn(launched.stderr);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(drain.snapshot().contains("warning-text"));

        let mut child = launched.child;
        let _ = child.kill().await;
    }
}
