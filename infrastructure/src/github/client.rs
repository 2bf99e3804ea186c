//! Retrying GitHub tool client.
//!
//! Implements the application's [`RepoToolPort`]: shapes typed parameters
//! into wire requests, dispatches them over the configured transport, and
//! applies the [`RetryPolicy`] with a fixed backoff.
//!
//! Retry discipline: transport-level failures (launch refused, startup
//! crash, timeout, malformed reply) are retried with the same request; a
//! well-formed `error` payload is the remote tool explicitly saying "no"
//! and is returned immediately. After exhausting attempts the last failure
//! comes back as an `Err`, never a panic — batch callers log and continue.

use super::canned;
use crate::server::command::ServerCommand;
use crate::server::http::{HttpServerConfig, HttpToolServer};
use crate::server::session::{ServerSession, SessionState};
use async_trait::async_trait;
use harvest_application::ports::repo_tools::{ClientError, RepoToolPort};
use harvest_domain::{RepoRef, RetryPolicy, ToolRequest, ToolResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How exchanges reach the tool-server.
///
/// One consolidated client with an explicit mode, instead of picking an
/// implementation by which module happens to be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    /// Fresh process per exchange; full isolation, no leak on any outcome.
    /// The mode used for anything retried per-item.
    OneShot,
    /// One long-lived process shared by sequential exchanges; amortizes
    /// process start cost.
    Persistent,
    /// Launch the process, poll its HTTP endpoint until ready, exchange
    /// over HTTP, terminate.
    Http,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::OneShot
    }
}

/// Everything the client needs to reach a tool-server.
#[derive(Debug, Clone)]
pub struct ToolClientConfig {
    pub command: ServerCommand,
    pub mode: TransportMode,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    /// Used only in [`TransportMode::Http`].
    pub http: HttpServerConfig,
}

impl ToolClientConfig {
    pub fn new(command: ServerCommand) -> Self {
        Self {
            command,
            mode: TransportMode::OneShot,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            http: HttpServerConfig::default(),
        }
    }
}

/// Client for the GitHub tool-server operations.
pub struct GitHubToolClient {
    command: ServerCommand,
    mode: TransportMode,
    retry: RetryPolicy,
    request_timeout: Duration,
    http: HttpToolServer,
    /// Persistent-mode session. The lock serializes exchanges: the process
    /// handle is exclusively owned and requests are strictly ordered.
    session: Mutex<Option<ServerSession>>,
    degraded: bool,
}

impl GitHubToolClient {
    /// Build a client.
    ///
    /// When the configured server program cannot be located on `PATH` the
    /// client comes up in degraded mode: `search_repositories` and
    /// `get_file_contents` are served from canned data tagged
    /// `"mocked": true`, everything else fails. Degradation is decided
    /// here, once, explicitly — not by catching failures later.
    pub fn new(config: ToolClientConfig) -> Self {
        let degraded = which::which(&config.command.program).is_err();
        if degraded {
            warn!(
                "Tool-server program '{}' not found, serving canned results",
                config.command.program
            );
        } else {
            info!(
                "GitHub tool client ready ({:?} transport)",
                config.mode
            );
        }

        Self {
            command: config.command,
            mode: config.mode,
            retry: config.retry,
            request_timeout: config.request_timeout,
            http: HttpToolServer::new(config.http),
            session: Mutex::new(None),
            degraded,
        }
    }

    /// Whether the client is serving canned results.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Stop the persistent session, if one is running. Safe to call at any
    /// time, including when no session was ever started.
    pub async fn shutdown(&self) {
        if let Some(mut session) = self.session.lock().await.take() {
            session.stop().await;
        }
    }

    /// Dispatch one request with retries.
    async fn call(&self, request: ToolRequest) -> Result<Value, ClientError> {
        if self.degraded {
            return canned::respond(&request)
                .ok_or_else(|| ClientError::Unavailable(request.tool.clone()));
        }

        let mut last = None;
        for attempt in 1..=self.retry.max_attempts {
            match self.exchange(&request).await {
                ToolResponse::Success { result } => return Ok(result),
                ToolResponse::Failure { error } => {
                    if !error.is_retryable() {
                        debug!("Tool rejected {}: {}", request.tool, error);
                        return Err(ClientError::Exchange(error));
                    }
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, self.retry.max_attempts, request.tool, error
                    );
                    let wait = self.retry.has_remaining(attempt);
                    last = Some(error);
                    if wait {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
            }
        }

        // max_attempts >= 1, so at least one failure was recorded
        Err(last
            .map(ClientError::Exchange)
            .unwrap_or_else(|| ClientError::Unavailable(request.tool)))
    }

    /// One exchange over the configured transport.
    async fn exchange(&self, request: &ToolRequest) -> ToolResponse {
        match self.mode {
            TransportMode::OneShot => {
                ServerSession::send_request_one_shot(
                    self.command.clone(),
                    self.request_timeout,
                    request,
                )
                .await
            }
            TransportMode::Persistent => self.exchange_persistent(request).await,
            TransportMode::Http => self.exchange_http(request).await,
        }
    }

    async fn exchange_persistent(&self, request: &ToolRequest) -> ToolResponse {
        let mut guard = self.session.lock().await;
        let session = guard.get_or_insert_with(|| {
            ServerSession::new(self.command.clone()).with_request_timeout(self.request_timeout)
        });

        if session.state() != SessionState::Running {
            if let Err(e) = session.start().await {
                return ToolResponse::failure(e.into());
            }
        }

        match session.send_request(request).await {
            Ok(response) => response,
            Err(e) => ToolResponse::failure(e.into()),
        }
    }

    /// HTTP-fronted exchange: the server is still a child process — launch
    /// it, wait for readiness, call, terminate.
    async fn exchange_http(&self, request: &ToolRequest) -> ToolResponse {
        let mut session =
            ServerSession::new(self.command.clone()).with_request_timeout(self.request_timeout);
        if let Err(e) = session.start().await {
            return ToolResponse::failure(e.into());
        }

        let response = if self.http.wait_until_ready().await {
            self.http.call(request).await
        } else {
            ToolResponse::failure(harvest_domain::FailureReason::Transport(
                "tool-server did not become ready".to_string(),
            ))
        };

        session.stop().await;
        response
    }
}

#[async_trait]
impl RepoToolPort for GitHubToolClient {
    async fn search_repositories(&self, query: &str) -> Result<Value, ClientError> {
        self.call(ToolRequest::new("search_repositories").with_arg("query", query))
            .await
    }

    async fn get_file_contents(&self, repo: &RepoRef, path: &str) -> Result<Value, ClientError> {
        self.call(
            ToolRequest::new("get_file_contents")
                .with_arg("owner", repo.owner.clone())
                .with_arg("repo", repo.repo.clone())
                .with_arg("path", path)
                .with_arg("branch", repo.branch.clone()),
        )
        .await
    }

    async fn list_issues(&self, repo: &RepoRef, state: &str) -> Result<Value, ClientError> {
        self.call(
            ToolRequest::new("list_issues")
                .with_arg("owner", repo.owner.clone())
                .with_arg("repo", repo.repo.clone())
                .with_arg("state", state),
        )
        .await
    }

    async fn get_issue(&self, repo: &RepoRef, issue_number: u64) -> Result<Value, ClientError> {
        self.call(
            ToolRequest::new("get_issue")
                .with_arg("owner", repo.owner.clone())
                .with_arg("repo", repo.repo.clone())
                .with_arg("issue_number", issue_number),
        )
        .await
    }

    async fn list_pull_requests(
        &self,
        repo: &RepoRef,
        state: &str,
    ) -> Result<Value, ClientError> {
        self.call(
            ToolRequest::new("list_pull_requests")
                .with_arg("owner", repo.owner.clone())
                .with_arg("repo", repo.repo.clone())
                .with_arg("state", state),
        )
        .await
    }

    async fn get_pull_request(
        &self,
        repo: &RepoRef,
        pull_number: u64,
    ) -> Result<Value, ClientError> {
        self.call(
            ToolRequest::new("get_pull_request")
                .with_arg("owner", repo.owner.clone())
                .with_arg("repo", repo.repo.clone())
                .with_arg("pull_number", pull_number),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_domain::FailureReason;

    fn shell_client(script: String, retry: RetryPolicy) -> GitHubToolClient {
        let mut config = ToolClientConfig::new(
            ServerCommand::new("sh").with_arg("-c").with_arg(script),
        );
        config.retry = retry;
        config.request_timeout = Duration::from_secs(5);
        GitHubToolClient::new(config)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_call_returns_result() {
        let client = shell_client(
            r#"read line; echo '{"result":{"items":[{"number":1}]}}'"#.to_string(),
            RetryPolicy::no_retry(),
        );

        let result = client
            .list_issues(&RepoRef::new("acme", "widgets"), "all")
            .await
            .unwrap();
        assert_eq!(result["items"][0]["number"], 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn retry_exhaustion_makes_exactly_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let probe = dir.path().join("attempts");
        let script = format!(
            "echo attempt >> {}; exit 1",
            probe.display()
        );

        let client = shell_client(script, RetryPolicy::new(3, Duration::ZERO));
        let err = client
            .get_issue(&RepoRef::new("acme", "widgets"), 5)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Exchange(_)));
        let attempts = std::fs::read_to_string(&probe).unwrap();
        assert_eq!(attempts.lines().count(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tool_error_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let probe = dir.path().join("attempts");
        let script = format!(
            r#"echo attempt >> {}; read line; echo '{{"error":"bad credentials"}}'"#,
            probe.display()
        );

        let client = shell_client(script, RetryPolicy::new(3, Duration::ZERO));
        let err = client
            .get_issue(&RepoRef::new("acme", "widgets"), 5)
            .await
            .unwrap_err();

        assert!(err.is_tool_error());
        let attempts = std::fs::read_to_string(&probe).unwrap();
        assert_eq!(attempts.lines().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exhausted_retries_carry_the_last_failure() {
        let client = shell_client(
            "read line; echo not json".to_string(),
            RetryPolicy::new(2, Duration::ZERO),
        );

        let err = client.search_repositories("repo:acme/widgets").await.unwrap_err();
        match err {
            ClientError::Exchange(reason) => {
                assert!(matches!(reason, FailureReason::InvalidJson));
            }
            other => panic!("expected Exchange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_degrades_to_canned_results() {
        let config = ToolClientConfig::new(ServerCommand::new(
            "definitely-not-a-real-program-xyz",
        ));
        let client = GitHubToolClient::new(config);
        assert!(client.is_degraded());

        let result = client
            .search_repositories("repo:acme/widgets")
            .await
            .unwrap();
        assert_eq!(result["mocked"], true);
        assert_eq!(result["items"][0]["full_name"], "acme/widgets");

        let err = client
            .list_issues(&RepoRef::new("acme", "widgets"), "all")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn persistent_mode_reuses_one_session() {
        let mut config = ToolClientConfig::new(
            ServerCommand::new("sh").with_arg("-c").with_arg(
                r#"while read line; do echo '{"result":{"ok":true}}'; done"#,
            ),
        );
        config.mode = TransportMode::Persistent;
        config.retry = RetryPolicy::no_retry();
        let client = GitHubToolClient::new(config);

        for _ in 0..3 {
            let result = client
                .list_issues(&RepoRef::new("acme", "widgets"), "all")
                .await
                .unwrap();
            assert_eq!(result["ok"], true);
        }

        client.shutdown().await;
    }
}
