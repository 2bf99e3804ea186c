//! Line-oriented request/response codec.
//!
//! One request is one newline-terminated JSON line; one response is one
//! JSON line containing either a `result` key or an `error` key. Decoding
//! never fails — every malformed input maps to a distinct
//! [`FailureReason`] so callers can tell "the process died" apart from
//! "the process misbehaved".

use super::error::Result;
use harvest_domain::{FailureReason, ToolRequest, ToolResponse};
use serde_json::Value;

/// Serialize a request to its newline-terminated wire line.
pub fn encode(request: &ToolRequest) -> Result<String> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}

/// Parse one response line.
///
/// An empty line (nothing read before EOF or the deadline) is
/// `no response received`; an unparsable line is `invalid JSON response`;
/// a parsed object with neither `result` nor `error` is
/// `invalid response format`.
pub fn decode(line: &str) -> ToolResponse {
    let line = line.trim();
    if line.is_empty() {
        return ToolResponse::failure(FailureReason::NoResponse);
    }

    match serde_json::from_str::<Value>(line) {
        Ok(value) => classify_payload(&value),
        Err(_) => ToolResponse::failure(FailureReason::InvalidJson),
    }
}

/// Classify a parsed payload by its `result` / `error` keys.
///
/// Shared by the stdio codec and the HTTP transport — both protocols use
/// the same success/error envelope.
pub(crate) fn classify_payload(value: &Value) -> ToolResponse {
    if let Some(result) = value.get("result") {
        return ToolResponse::success(result.clone());
    }
    match value.get("error") {
        Some(error) => ToolResponse::failure(FailureReason::Tool(error.clone())),
        None => ToolResponse::failure(FailureReason::InvalidFormat),
    }
}
