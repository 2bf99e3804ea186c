//! Error types for the tool-server transport

use harvest_domain::FailureReason;
use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur while managing a tool-server process.
///
/// Exchange-level outcomes (timeouts, malformed responses, tool `error`
/// payloads) are not errors at this layer — they travel as
/// [`ToolResponse::Failure`](harvest_domain::ToolResponse). This enum is
/// only for the process itself going wrong.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The OS refused to spawn the process (program missing, resources).
    #[error("failed to launch tool-server: {0}")]
    Launch(#[source] std::io::Error),

    /// The process exited within the startup grace interval.
    #[error("tool-server exited during startup (status {status:?}): {stderr}")]
    StartupCrash {
        status: Option<i32>,
        stderr: String,
    },

    /// A request was sent outside the `Running` state.
    #[error("tool-server session is not running")]
    NotRunning,

    /// Writing the request line to the child's stdin failed.
    #[error("failed to write to tool-server stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// The request could not be serialized to a wire line.
    #[error("failed to encode request: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ServerError> for FailureReason {
    fn from(err: ServerError) -> Self {
        FailureReason::Transport(err.to_string())
    }
}
