//! Application layer for repoharvest
//!
//! This crate contains use cases and port definitions. It depends only on
//! the domain layer; adapters for the ports live in the infrastructure
//! layer and are injected at construction time.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    page_store::{PageStorePort, StoreError},
    progress::{NoProgress, SyncPhase, SyncProgress},
    repo_tools::{ClientError, RepoToolPort},
};
pub use use_cases::sync_repository::{
    SyncError, SyncReport, SyncRepositoryInput, SyncRepositoryUseCase,
};
