//! Sync configuration from TOML (`[sync]` section)

use serde::{Deserialize, Serialize};

/// `[sync]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSyncConfig {
    /// Bound on concurrent in-flight file fetches
    pub max_concurrent: usize,
    /// Sync issues by default
    pub include_issues: bool,
    /// Sync pull requests by default
    pub include_pull_requests: bool,
}

impl Default for FileSyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            include_issues: false,
            include_pull_requests: false,
        }
    }
}
