//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section has full defaults, so an empty file (or no file at all)
//! yields a working configuration.
//!
//! ```toml
//! [server]
//! program = "npx"
//! args = ["-y", "@modelcontextprotocol/server-github"]
//! mode = "one-shot"
//!
//! [retry]
//! max_attempts = 3
//! backoff_seconds = 2.0
//!
//! [sync]
//! max_concurrent = 5
//!
//! [storage]
//! output_path = "harvest/pages.jsonl"
//! ```

mod retry;
mod server;
mod storage;
mod sync;

pub use retry::FileRetryConfig;
pub use server::{FileHttpConfig, FileServerConfig};
pub use storage::FileStorageConfig;
pub use sync::FileSyncConfig;

use crate::github::ToolClientConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Tool-server launch and transport settings
    pub server: FileServerConfig,
    /// Retry policy applied by the domain client
    pub retry: FileRetryConfig,
    /// Sync orchestration settings
    pub sync: FileSyncConfig,
    /// Page store settings
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Assemble the tool client configuration from the relevant sections.
    pub fn to_client_config(&self) -> ToolClientConfig {
        ToolClientConfig {
            command: self.server.to_command(),
            mode: self.server.mode,
            retry: self.retry.to_policy(),
            request_timeout: self.server.request_timeout(),
            http: self.server.http.to_http_config(),
        }
    }

    /// Sanity-check the configuration, returning human-readable warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.server.program.trim().is_empty() {
            issues.push("server.program is empty".to_string());
        }
        if self.server.request_timeout_secs == 0 {
            issues.push("server.request_timeout_secs is 0; every exchange will time out".into());
        }
        if self.retry.max_attempts == 0 {
            issues.push("retry.max_attempts is 0; it will be treated as 1".to_string());
        }
        if self.retry.backoff_seconds < 0.0 {
            issues.push("retry.backoff_seconds is negative; it will be treated as 0".into());
        }
        if self.sync.max_concurrent == 0 {
            issues.push("sync.max_concurrent is 0; it will be treated as 1".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.server.program, "npx");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn zero_values_are_flagged() {
        let mut config = FileConfig::default();
        config.retry.max_attempts = 0;
        config.sync.max_concurrent = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn client_config_carries_retry_policy() {
        let mut config = FileConfig::default();
        config.retry.max_attempts = 5;
        config.retry.backoff_seconds = 0.5;

        let client = config.to_client_config();
        assert_eq!(client.retry.max_attempts, 5);
        assert_eq!(client.retry.backoff, std::time::Duration::from_millis(500));
    }
}
