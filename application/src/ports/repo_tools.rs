//! Repository tools port
//!
//! Defines the typed interface for the GitHub domain operations served by
//! the external tool-server. The infrastructure adapter shapes each call
//! into a wire request, applies the retry policy, and returns either the
//! result payload or the last failure.

use async_trait::async_trait;
use harvest_domain::{FailureReason, RepoRef};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced to callers of the repository tools port.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// The exchange failed and the retry budget is exhausted (or the tool
    /// itself rejected the request, which is never retried).
    #[error("{0}")]
    Exchange(#[from] FailureReason),

    /// The operation has no canned equivalent while the client is running
    /// without a tool-server (degraded mode).
    #[error("operation unavailable without a tool-server: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Whether this error came from the remote tool saying "no" (as opposed
    /// to a transport-level failure).
    pub fn is_tool_error(&self) -> bool {
        matches!(self, ClientError::Exchange(FailureReason::Tool(_)))
    }
}

/// Typed facade over the tool-server's GitHub operations.
///
/// Each method maps 1:1 to one tool request; implementations own argument
/// shaping and retries. All methods return a raw JSON payload — the shape
/// of each payload is decided by the remote tool, and callers pick out the
/// fields they need.
#[async_trait]
pub trait RepoToolPort: Send + Sync {
    /// `search_repositories {query}`
    async fn search_repositories(&self, query: &str) -> Result<Value, ClientError>;

    /// `get_file_contents {owner, repo, path, branch}` — a file path yields
    /// a content object, a directory path yields a listing array.
    async fn get_file_contents(&self, repo: &RepoRef, path: &str) -> Result<Value, ClientError>;

    /// `list_issues {owner, repo, state}`
    async fn list_issues(&self, repo: &RepoRef, state: &str) -> Result<Value, ClientError>;

    /// `get_issue {owner, repo, issue_number}`
    async fn get_issue(&self, repo: &RepoRef, issue_number: u64) -> Result<Value, ClientError>;

    /// `list_pull_requests {owner, repo, state}`
    async fn list_pull_requests(&self, repo: &RepoRef, state: &str)
    -> Result<Value, ClientError>;

    /// `get_pull_request {owner, repo, pull_number}`
    async fn get_pull_request(&self, repo: &RepoRef, pull_number: u64)
    -> Result<Value, ClientError>;
}
