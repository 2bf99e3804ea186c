//! Tool response value objects — the outcome of one tool-server exchange.
//!
//! The wire form is a single JSON line containing either a `result` key or
//! an `error` key. Everything else — no line at all, an unparsable line, a
//! line with neither key — is a [`FailureReason`] of its own, because the
//! causes and remediation differ (process died vs. process misbehaved).
//!
//! Failure reasons carry their retryability: transport-level failures are
//! worth another attempt, while an `error` payload from the tool itself is
//! the remote explicitly saying "no" and is handed back to the caller
//! without automatic retry.

use serde_json::Value;
use thiserror::Error;

/// Why a tool exchange failed.
#[derive(Debug, Clone, Error)]
pub enum FailureReason {
    /// No bytes arrived before EOF or the deadline — the process died,
    /// never answered, or the read timed out.
    #[error("no response received")]
    NoResponse,

    /// A line arrived but was not valid JSON.
    #[error("invalid JSON response")]
    InvalidJson,

    /// Valid JSON, but neither a `result` nor an `error` key.
    #[error("invalid response format")]
    InvalidFormat,

    /// A well-formed response carrying an application-level `error` payload.
    #[error("tool error: {0}")]
    Tool(Value),

    /// The transport itself failed before an exchange could complete
    /// (launch refused, startup crash, broken pipe).
    #[error("transport error: {0}")]
    Transport(String),
}

impl FailureReason {
    /// Whether another attempt with the same request could plausibly
    /// succeed.
    ///
    /// | Reason | Retryable? |
    /// |--------|-----------|
    /// | `NoResponse` | Yes — timeout or early death may be transient |
    /// | `InvalidJson` / `InvalidFormat` | Yes — the process misbehaved once |
    /// | `Transport` | Yes — e.g. resource exhaustion at spawn time |
    /// | `Tool` | No — the remote tool rejected the request itself |
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureReason::Tool(_))
    }
}

/// Result of one request/response exchange with a tool-server.
#[derive(Debug, Clone)]
pub enum ToolResponse {
    /// The response carried a `result` payload.
    Success { result: Value },
    /// The exchange failed; see [`FailureReason`].
    Failure { error: FailureReason },
}

impl ToolResponse {
    /// Create a successful response.
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    /// Create a failed response.
    pub fn failure(error: FailureReason) -> Self {
        Self::Failure { error }
    }

    /// Whether the exchange succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The result payload, if any.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason, if any.
    pub fn error(&self) -> Option<&FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Consume into a `Result`, for callers who want `?`.
    pub fn into_result(self) -> Result<Value, FailureReason> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Failure { error } => Err(error),
        }
    }
}
