//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Where the JSONL page store writes
    pub output_path: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("harvest/pages.jsonl"),
        }
    }
}
