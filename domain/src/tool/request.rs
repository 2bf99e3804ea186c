//! Tool request value object — one unit of work sent to a tool-server.
//!
//! The wire form is a single JSON line: `{"tool": <name>, "args": {...}}`.
//! Requests are constructed per call and never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named tool invocation with its argument map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Name of the tool to invoke (e.g. `get_file_contents`)
    pub tool: String,
    /// Named arguments for the tool
    #[serde(rename = "args")]
    pub arguments: Map<String, Value>,
}

impl ToolRequest {
    /// Create a request with an empty argument map.
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments: Map::new(),
        }
    }

    /// Add an argument (builder style).
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Add an argument only when a value is present.
    ///
    /// Keeps optional parameters (e.g. `branch`) off the wire entirely
    /// rather than sending `null`.
    pub fn with_opt_arg(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.with_arg(key, v),
            None => self,
        }
    }

    /// Look up an argument by name.
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_arg_builds_argument_map() {
        let request = ToolRequest::new("get_issue")
            .with_arg("owner", "acme")
            .with_arg("issue_number", 7);

        assert_eq!(request.tool, "get_issue");
        assert_eq!(request.arg("owner"), Some(&Value::from("acme")));
        assert_eq!(request.arg("issue_number"), Some(&Value::from(7)));
    }

    #[test]
    fn with_opt_arg_skips_none() {
        let request = ToolRequest::new("get_file_contents")
            .with_arg("path", "README.md")
            .with_opt_arg("branch", None::<&str>);

        assert!(request.arg("branch").is_none());
    }

    #[test]
    fn serializes_arguments_under_args_key() {
        let request = ToolRequest::new("search_repositories").with_arg("query", "repo:acme/widgets");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tool"], "search_repositories");
        assert_eq!(json["args"]["query"], "repo:acme/widgets");
        assert!(json.get("arguments").is_none());
    }
}
