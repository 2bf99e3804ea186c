//! Canned results for degraded mode.
//!
//! When the tool-server binary cannot be located, a small fixed set of
//! operations is served from these placeholders so dependent pipeline
//! stages can complete a smoke test. Every payload carries
//! `"mocked": true` so production callers can detect and reject it.

use harvest_domain::ToolRequest;
use serde_json::{Value, json};

/// `"# Placeholder\n"` — a base64 body that decodes cleanly downstream.
const PLACEHOLDER_CONTENT_B64: &str = "IyBQbGFjZWhvbGRlcgo=";

/// Answer a request from canned data, or `None` when the operation has no
/// canned equivalent.
pub(crate) fn respond(request: &ToolRequest) -> Option<Value> {
    match request.tool.as_str() {
        "search_repositories" => {
            let full_name = request
                .arg("query")
                .and_then(Value::as_str)
                .and_then(|q| q.strip_prefix("repo:"))
                .unwrap_or("example/placeholder");
            let name = full_name.rsplit('/').next().unwrap_or(full_name);

            Some(json!({
                "mocked": true,
                "items": [{
                    "name": name,
                    "full_name": full_name,
                    "description": "Placeholder repository served without a tool-server",
                    "default_branch": "main",
                    "stargazers_count": 0,
                    "forks_count": 0,
                }],
            }))
        }
        "get_file_contents" => Some(json!({
            "mocked": true,
            "content": PLACEHOLDER_CONTENT_B64,
            "encoding": "base64",
            "sha": "0000000",
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    #[test]
    fn search_echoes_the_queried_repo() {
        let request =
            ToolRequest::new("search_repositories").with_arg("query", "repo:acme/widgets");
        let value = respond(&request).unwrap();

        assert_eq!(value["mocked"], true);
        assert_eq!(value["items"][0]["full_name"], "acme/widgets");
        assert_eq!(value["items"][0]["name"], "widgets");
    }

    #[test]
    fn file_contents_decode_to_valid_text() {
        let request = ToolRequest::new("get_file_contents").with_arg("path", "README.md");
        let value = respond(&request).unwrap();

        assert_eq!(value["mocked"], true);
        let decoded = STANDARD
            .decode(value["content"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"# Placeholder\n");
    }

    #[test]
    fn other_operations_have_no_canned_result() {
        assert!(respond(&ToolRequest::new("list_issues")).is_none());
        assert!(respond(&ToolRequest::new("get_pull_request")).is_none());
    }
}
