//! Subprocess session manager.
//!
//! Owns one tool-server child process through the
//! `NotStarted → Running → Stopped` lifecycle and performs strictly
//! ordered request/response exchanges on it (no pipelining).
//!
//! Two usage modes, selected by the caller:
//!
//! - **Persistent**: `start()` once, `send_request()` many times, `stop()`
//!   at the end — amortizes process start cost across requests.
//! - **One-shot**: [`ServerSession::send_request_one_shot`] launches a
//!   fresh process, performs a single exchange, and terminates it
//!   unconditionally — no state shared between invocations, no leak on any
//!   outcome.
//!
//! Retries are deliberately *not* here; they belong to the domain client
//! layered above.

use super::codec;
use super::command::ServerCommand;
use super::error::{Result, ServerError};
use super::launcher::{self, LaunchedServer};
use super::reader::{self, StderrDrain};
use harvest_domain::{ToolRequest, ToolResponse};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tracing::{debug, info, warn};

/// How long a just-spawned process gets to prove it did not die on arrival.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

/// How long a graceful termination may take before the forceful kill.
const GRACEFUL_SHUTDOWN: Duration = Duration::from_secs(5);

/// Default per-exchange deadline.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Stopped,
}

/// The live process and its stream handles. Exclusively owned by one
/// session; never reused after `stop()` — a fresh `start()` makes a new
/// process and a new handle.
struct LiveServer {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: StderrDrain,
    /// Set when an exchange timed out: the abandoned read may still eat
    /// the next response line, so the process must not be reused as-is.
    tainted: bool,
}

/// Manager for one tool-server child process.
pub struct ServerSession {
    command: ServerCommand,
    request_timeout: Duration,
    state: SessionState,
    live: Option<LiveServer>,
}

impl ServerSession {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: SessionState::NotStarted,
            live: None,
        }
    }

    /// Override the per-exchange deadline (builder style).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Launch the tool-server. Already-running sessions are left alone.
    ///
    /// A process that exits within the startup grace interval never reaches
    /// `Running`; its buffered stderr is captured into the error.
    pub async fn start(&mut self) -> Result<()> {
        if self.state == SessionState::Running {
            return Ok(());
        }

        info!("Starting tool-server: {}", self.command.display_line());
        let LaunchedServer {
            mut child,
            stdin,
            stdout,
            stderr,
        } = launcher::spawn(&self.command)?;
        let stderr = StderrDrain::spawn(stderr);

        // Grace poll: an immediate exit means the server never came up
        tokio::time::sleep(STARTUP_GRACE).await;
        if let Ok(Some(status)) = child.try_wait() {
            let stderr_text = stderr.snapshot();
            return Err(ServerError::StartupCrash {
                status: status.code(),
                stderr: stderr_text,
            });
        }

        self.live = Some(LiveServer {
            child,
            stdin,
            stdout,
            stderr,
            tainted: false,
        });
        self.state = SessionState::Running;
        Ok(())
    }

    /// Perform one strictly ordered request/response exchange.
    ///
    /// A timeout or malformed reply comes back as a
    /// [`ToolResponse::Failure`], not an `Err` — only the process itself
    /// going wrong (not running, broken stdin) is an error. No implicit
    /// retry happens here.
    pub async fn send_request(&mut self, request: &ToolRequest) -> Result<ToolResponse> {
        if self.state != SessionState::Running {
            return Err(ServerError::NotRunning);
        }

        // A timed-out session is suspect: restart before reusing it.
        if self.live.as_ref().is_some_and(|live| live.tainted) {
            debug!("Restarting tool-server after a timed-out exchange");
            self.stop().await;
            self.start().await?;
        }

        let live = self.live.as_mut().ok_or(ServerError::NotRunning)?;

        let line = codec::encode(request)?;
        live.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(ServerError::Stdin)?;
        live.stdin.flush().await.map_err(ServerError::Stdin)?;

        let (response_line, stderr_text) =
            reader::read_exchange(&mut live.stdout, &live.stderr, self.request_timeout).await;

        if !stderr_text.is_empty() {
            debug!("tool-server stderr so far: {} bytes", stderr_text.len());
        }
        if response_line.is_empty() {
            live.tainted = true;
        }

        Ok(codec::decode(&response_line))
    }

    /// Terminate the tool-server: graceful signal, bounded wait, then the
    /// forceful kill. Always ends in `Stopped`, never returns an error, and
    /// is safe to call repeatedly and from cleanup paths.
    pub async fn stop(&mut self) {
        self.state = SessionState::Stopped;
        let Some(live) = self.live.take() else {
            return;
        };

        info!("Stopping tool-server");
        let LiveServer {
            mut child,
            stdin,
            stderr,
            ..
        } = live;

        // Closing stdin lets a well-behaved server exit on EOF
        drop(stdin);
        terminate_gracefully(&mut child).await;
        stderr.abort();
    }

    /// Launch a fresh server, perform a single exchange, terminate
    /// unconditionally. Success, failure, and timeout all end with the
    /// process gone; nothing is shared between one-shot invocations.
    pub async fn send_request_one_shot(
        command: ServerCommand,
        request_timeout: Duration,
        request: &ToolRequest,
    ) -> ToolResponse {
        let mut session = ServerSession::new(command).with_request_timeout(request_timeout);

        if let Err(e) = session.start().await {
            warn!("One-shot launch failed: {}", e);
            return ToolResponse::failure(e.into());
        }

        let response = match session.send_request(request).await {
            Ok(response) => response,
            Err(e) => ToolResponse::failure(e.into()),
        };

        session.stop().await;
        response
    }
}

impl Drop for ServerSession {
    fn drop(&mut self) {
        if let Some(live) = self.live.as_mut() {
            debug!("ServerSession dropped while running, killing tool-server");
            let _ = live.child.start_kill();
        }
    }
}

/// SIGTERM (unix), wait up to [`GRACEFUL_SHUTDOWN`], then SIGKILL and wait
/// again. Failures are logged, never propagated — teardown must be
/// unconditionally safe.
async fn terminate_gracefully(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: plain kill(2) on a pid we own; no memory is touched.
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
    }

    match tokio::time::timeout(GRACEFUL_SHUTDOWN, child.wait()).await {
        Ok(Ok(status)) => {
            debug!("tool-server exited: {}", status);
            return;
        }
        Ok(Err(e)) => {
            warn!("wait for tool-server failed: {}", e);
        }
        Err(_) => {
            warn!(
                "tool-server did not exit within {:?}, killing",
                GRACEFUL_SHUTDOWN
            );
        }
    }

    if let Err(e) = child.kill().await {
        warn!("failed to kill tool-server: {}", e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use harvest_domain::FailureReason;
    use std::time::Instant;

    fn shell(script: &str) -> ServerCommand {
        ServerCommand::new("sh").with_arg("-c").with_arg(script)
    }

    /// A server that answers every request line with a fixed result.
    fn echo_result_server() -> ServerCommand {
        shell(r#"while read line; do echo '{"result":{"ok":true}}'; done"#)
    }

    #[tokio::test]
    async fn send_before_start_is_not_running() {
        let mut session = ServerSession::new(echo_result_server());
        let err = session
            .send_request(&ToolRequest::new("search_repositories"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotRunning));
    }

    #[tokio::test]
    async fn persistent_session_orders_multiple_exchanges() {
        let mut session = ServerSession::new(echo_result_server());
        session.start().await.unwrap();
        assert_eq!(session.state(), SessionState::Running);

        for _ in 0..3 {
            let response = session
                .send_request(&ToolRequest::new("list_issues").with_arg("owner", "acme"))
                .await
                .unwrap();
            assert!(response.is_success());
        }

        session.stop().await;
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn startup_crash_captures_stderr() {
        let mut session = ServerSession::new(shell("echo boom >&2; exit 3"));
        let err = session.start().await.unwrap_err();

        match err {
            ServerError::StartupCrash { status, stderr } => {
                assert_eq!(status, Some(3));
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected StartupCrash, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[tokio::test]
    async fn server_death_after_request_is_no_response() {
        let mut session = ServerSession::new(shell("read line; exit 0"));
        session.start().await.unwrap();

        let response = session
            .send_request(&ToolRequest::new("get_issue"))
            .await
            .unwrap();
        assert!(matches!(
            response.error(),
            Some(FailureReason::NoResponse)
        ));

        session.stop().await;
    }

    #[tokio::test]
    async fn garbage_reply_is_invalid_json() {
        let mut session = ServerSession::new(shell("read line; echo not json"));
        session.start().await.unwrap();

        let response = session
            .send_request(&ToolRequest::new("get_issue"))
            .await
            .unwrap();
        assert!(matches!(
            response.error(),
            Some(FailureReason::InvalidJson)
        ));

        session.stop().await;
    }

    #[tokio::test]
    async fn one_shot_timeout_is_bounded() {
        let start = Instant::now();
        let response = ServerSession::send_request_one_shot(
            shell("sleep 30"),
            Duration::from_millis(300),
            &ToolRequest::new("search_repositories"),
        )
        .await;
        let elapsed = start.elapsed();

        assert!(matches!(
            response.error(),
            Some(FailureReason::NoResponse)
        ));
        // startup grace + deadline + termination, with scheduling slack
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn one_shot_success_leaves_no_process() {
        let response = ServerSession::send_request_one_shot(
            shell(r#"read line; echo '{"result":{"content":"SGVsbG8=","encoding":"base64","sha":"abc123"}}'"#),
            Duration::from_secs(5),
            &ToolRequest::new("get_file_contents")
                .with_arg("owner", "acme")
                .with_arg("repo", "widgets")
                .with_arg("path", "README.md")
                .with_arg("branch", "main"),
        )
        .await;

        let result = response.result().unwrap();
        assert_eq!(result["content"], "SGVsbG8=");

        use base64::{Engine as _, engine::general_purpose::STANDARD};
        let decoded = STANDARD
            .decode(result["content"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn repeated_one_shots_leak_no_processes() {
        let marker = format!("harvest-leak-probe-{}", std::process::id());

        for i in 0..10 {
            // Alternate success, timeout, and startup-crash outcomes
            let script = match i % 3 {
                0 => format!(r#"read line; echo '{{"result":{{}}}}' # {marker}"#),
                1 => format!("sleep 30 # {marker}"),
                _ => format!("exit 1 # {marker}"),
            };
            let _ = ServerSession::send_request_one_shot(
                shell(&script),
                Duration::from_millis(200),
                &ToolRequest::new("search_repositories"),
            )
            .await;
        }

        // Let the last teardown settle, then scan for survivors
        tokio::time::sleep(Duration::from_millis(300)).await;
        let mut live = 0;
        for entry in std::fs::read_dir("/proc").unwrap().flatten() {
            let cmdline = entry.path().join("cmdline");
            if let Ok(content) = std::fs::read(cmdline)
                && String::from_utf8_lossy(&content).contains(&marker)
            {
                live += 1;
            }
        }
        assert_eq!(live, 0, "leaked {live} tool-server processes");
    }

    #[tokio::test]
    async fn stop_twice_is_idempotent() {
        let mut session = ServerSession::new(echo_result_server());
        session.start().await.unwrap();

        session.stop().await;
        session.stop().await;
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn stop_without_start_is_safe() {
        let mut session = ServerSession::new(echo_result_server());
        session.stop().await;
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn restart_after_stop_creates_fresh_process() {
        let mut session = ServerSession::new(echo_result_server());
        session.start().await.unwrap();
        session.stop().await;

        session.start().await.unwrap();
        let response = session
            .send_request(&ToolRequest::new("list_issues"))
            .await
            .unwrap();
        assert!(response.is_success());
        session.stop().await;
    }

    #[tokio::test]
    async fn timed_out_session_restarts_before_reuse() {
        // First exchange times out (server answers nothing), second gets a
        // fresh process that answers immediately.
        let mut session = ServerSession::new(shell(
            r#"read line; sleep 30; while read line; do echo '{"result":{}}'; done"#,
        ))
        .with_request_timeout(Duration::from_millis(300));
        session.start().await.unwrap();

        let first = session
            .send_request(&ToolRequest::new("get_issue"))
            .await
            .unwrap();
        assert!(matches!(first.error(), Some(FailureReason::NoResponse)));

        // The replacement process runs the same script; its first exchange
        // also hits the `sleep`, proving a restart happened rather than a
        // reuse of the half-read pipe.
        let second = session
            .send_request(&ToolRequest::new("get_issue"))
            .await
            .unwrap();
        assert!(matches!(second.error(), Some(FailureReason::NoResponse)));

        session.stop().await;
    }
}
