//! Page store port
//!
//! Narrow interface to wherever synced pages end up. Embedding generation
//! and retrieval indexes are downstream consumers of the store, not
//! concerns of the sync itself.

use async_trait::async_trait;
use harvest_domain::Page;
use thiserror::Error;

/// Errors from the page store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write page: {0}")]
    Write(String),

    #[error("failed to serialize page: {0}")]
    Serialize(String),
}

/// Destination for synced pages.
#[async_trait]
pub trait PageStorePort: Send + Sync {
    /// Persist one page. Implementations must be safe to call from
    /// concurrent tasks.
    async fn save_page(&self, page: &Page) -> Result<(), StoreError>;
}
