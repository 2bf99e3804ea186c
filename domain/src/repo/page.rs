//! Synced page entity — one stored unit of repository content.

use serde::{Deserialize, Serialize};

/// What kind of repository content a page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    File,
    Issue,
    PullRequest,
}

/// Structured metadata recorded with every synced page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    /// `owner/repo`
    pub repo: String,
    pub kind: PageKind,
    /// File path within the repository (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Branch the content was read from (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Git blob SHA (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Issue or pull request number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    /// Issue or pull request state (`open`, `closed`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Label names attached to the issue or pull request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Content length in bytes at sync time
    pub content_length: usize,
    /// RFC 3339 timestamp of the sync
    pub crawled_at: String,
}

impl PageMetadata {
    pub fn new(repo: impl Into<String>, kind: PageKind, crawled_at: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            kind,
            path: None,
            branch: None,
            sha: None,
            number: None,
            state: None,
            labels: Vec::new(),
            content_length: 0,
            crawled_at: crawled_at.into(),
        }
    }
}

/// One synced unit of repository content, ready for the page store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub content: String,
    pub metadata: PageMetadata,
}

impl Page {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        mut metadata: PageMetadata,
    ) -> Self {
        let content = content.into();
        metadata.content_length = content.len();
        Self {
            url: url.into(),
            title: title.into(),
            content,
            metadata,
        }
    }
}
