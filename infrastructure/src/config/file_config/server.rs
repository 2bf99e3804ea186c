//! Tool-server configuration from TOML (`[server]` section)
//!
//! The launch command is fully configuration-supplied; platform quirks
//! (shell wrappers, package-runner paths) belong here, never in the
//! transport. The credential is injected through the child's environment
//! so it never appears in a process listing.

use crate::github::TransportMode;
use crate::server::command::ServerCommand;
use crate::server::http::HttpServerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Program to launch, resolved on `PATH`
    pub program: String,
    /// Argument vector passed verbatim
    pub args: Vec<String>,
    /// Transport mode: `one-shot`, `persistent`, or `http`
    pub mode: TransportMode,
    /// Per-exchange deadline in seconds
    pub request_timeout_secs: u64,
    /// Credential for the tool-server; falls back to the `GITHUB_TOKEN`
    /// environment variable when unset
    pub token: Option<String>,
    /// Environment variable name the credential is injected as
    pub token_env: String,
    /// Additional environment overlay entries
    pub env: BTreeMap<String, String>,
    /// HTTP transport settings (only used in `http` mode)
    pub http: FileHttpConfig,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-github".to_string(),
            ],
            mode: TransportMode::default(),
            request_timeout_secs: 30,
            token: None,
            token_env: "GITHUB_PERSONAL_ACCESS_TOKEN".to_string(),
            env: BTreeMap::new(),
            http: FileHttpConfig::default(),
        }
    }
}

impl FileServerConfig {
    /// Build the launch command with the credential in the env overlay.
    pub fn to_command(&self) -> ServerCommand {
        let mut command = ServerCommand::new(&self.program);
        for arg in &self.args {
            command = command.with_arg(arg);
        }
        for (key, value) in &self.env {
            command = command.with_env(key, value);
        }

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());
        if let Some(token) = token {
            command = command.with_env(&self.token_env, token);
        }

        command
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[server.http]` subsection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHttpConfig {
    pub url: String,
    pub ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for FileHttpConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            ready_timeout_secs: 15,
            poll_interval_ms: 500,
            request_timeout_secs: 10,
        }
    }
}

impl FileHttpConfig {
    pub fn to_http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            url: self.url.clone(),
            ready_timeout: Duration::from_secs(self.ready_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_is_the_github_server() {
        let config = FileServerConfig::default();
        let command = config.to_command();
        assert_eq!(command.program, "npx");
        assert_eq!(
            command.args,
            vec!["-y", "@modelcontextprotocol/server-github"]
        );
    }

    #[test]
    fn explicit_token_lands_in_env_overlay() {
        let config = FileServerConfig {
            token: Some("tok-123".to_string()),
            ..Default::default()
        };

        let command = config.to_command();
        assert_eq!(
            command
                .env
                .get("GITHUB_PERSONAL_ACCESS_TOKEN")
                .map(String::as_str),
            Some("tok-123")
        );
        assert!(!command.display_line().contains("tok-123"));
    }

    #[test]
    fn mode_deserializes_from_kebab_case() {
        let config: FileServerConfig =
            toml::from_str(r#"mode = "persistent""#).unwrap();
        assert_eq!(config.mode, TransportMode::Persistent);
    }
}
