//! Configuration — TOML file structure and multi-source loading.

pub mod file_config;
pub mod loader;

pub use file_config::{
    FileConfig, FileHttpConfig, FileRetryConfig, FileServerConfig, FileStorageConfig,
    FileSyncConfig,
};
pub use loader::ConfigLoader;
