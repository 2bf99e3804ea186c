//! Infrastructure layer for repoharvest
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the tool-server transports (subprocess and HTTP),
//! the retrying GitHub client, configuration file loading, and the JSONL
//! page store.

pub mod config;
pub mod github;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileRetryConfig, FileServerConfig, FileStorageConfig,
    FileSyncConfig,
};
pub use github::{GitHubToolClient, ToolClientConfig, TransportMode};
pub use server::{
    command::ServerCommand,
    error::{Result, ServerError},
    http::{HttpServerConfig, HttpToolServer},
    session::{ServerSession, SessionState},
};
pub use storage::JsonlPageStore;
