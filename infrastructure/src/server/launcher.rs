//! Process launcher — starts a tool-server child with piped streams.
//!
//! Launching does not wait for the server to be ready; readiness is the
//! caller's concern (the session manager's startup grace poll for stdio
//! servers, [`HttpToolServer::wait_until_ready`] for HTTP-fronted ones).
//!
//! [`HttpToolServer::wait_until_ready`]: super::http::HttpToolServer::wait_until_ready

use super::command::ServerCommand;
use super::error::{Result, ServerError};
use std::process::Stdio;
use tokio::io::BufReader;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::debug;

/// A freshly spawned tool-server with its streams detached for I/O.
#[derive(Debug)]
pub(crate) struct LaunchedServer {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: BufReader<ChildStdout>,
    pub stderr: ChildStderr,
}

/// Spawn the tool-server with all three standard streams piped.
pub(crate) fn spawn(command: &ServerCommand) -> Result<LaunchedServer> {
    debug!("Spawning tool-server: {}", command.display_line());

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in &command.env {
        cmd.env(key, value);
    }

    // Linux: request kernel to send SIGTERM to the child when the parent
    // dies. This catches cases where Drop doesn't run (SIGKILL, OOM kill).
    #[cfg(target_os = "linux")]
    unsafe {
        cmd.pre_exec(|| {
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
            Ok(())
        });
    }

    let mut child = cmd.spawn().map_err(ServerError::Launch)?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ServerError::Launch(std::io::Error::other("failed to capture stdin")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ServerError::Launch(std::io::Error::other("failed to capture stdout")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ServerError::Launch(std::io::Error::other("failed to capture stderr")))?;

    Ok(LaunchedServer {
        child,
        stdin,
        stdout: BufReader::new(stdout),
        stderr,
    })
}
