//! Sync repository use case
//!
//! Orchestrates a full repository sync: resolve the repository, store the
//! README, walk the file tree, then optionally issues and pull requests.
//!
//! Batch discipline: an individual item that cannot be fetched or stored is
//! logged and skipped — it never aborts the rest of the sync. Only a failed
//! repository lookup (there is nothing to sync) returns an error. File
//! fetches fan out concurrently under a semaphore so the tool-server and
//! the upstream API are not overwhelmed.

use crate::ports::page_store::PageStorePort;
use crate::ports::progress::{NoProgress, SyncPhase, SyncProgress};
use crate::ports::repo_tools::{ClientError, RepoToolPort};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use harvest_domain::{
    Page, PageKind, PageMetadata, RepoRef, is_binary_path, is_documentation_path,
};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Default bound on concurrent file fetches.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Errors that abort a sync before any batch work starts.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("repository {0} not found")]
    RepositoryNotFound(String),

    #[error("repository lookup failed: {0}")]
    Lookup(ClientError),
}

/// Input for the SyncRepository use case.
#[derive(Debug, Clone)]
pub struct SyncRepositoryInput {
    pub repo: RepoRef,
    pub include_issues: bool,
    pub include_pull_requests: bool,
    /// Bound on concurrent in-flight file fetches.
    pub max_concurrent: usize,
}

impl SyncRepositoryInput {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            include_issues: false,
            include_pull_requests: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_issues(mut self) -> Self {
        self.include_issues = true;
        self
    }

    pub fn with_pull_requests(mut self) -> Self {
        self.include_pull_requests = true;
        self
    }

    pub fn with_max_concurrent(mut self, bound: usize) -> Self {
        self.max_concurrent = bound.max(1);
        self
    }
}

/// Outcome summary of one sync run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SyncReport {
    /// `owner/repo`
    pub repo: String,
    /// Total pages stored
    pub processed: usize,
    /// Stored file pages (README included)
    pub files: usize,
    /// Stored issue pages
    pub issues: usize,
    /// Stored pull request pages
    pub pull_requests: usize,
    /// Items that were skipped, with the reason
    pub skipped: Vec<String>,
}

impl SyncReport {
    fn record_page(&mut self, kind: PageKind) {
        self.processed += 1;
        match kind {
            PageKind::File => self.files += 1,
            PageKind::Issue => self.issues += 1,
            PageKind::PullRequest => self.pull_requests += 1,
        }
    }

    fn record_skip(&mut self, what: impl Into<String>) {
        self.skipped.push(what.into());
    }
}

/// Use case for syncing one repository's content into the page store.
pub struct SyncRepositoryUseCase {
    tools: Arc<dyn RepoToolPort>,
    store: Arc<dyn PageStorePort>,
}

impl SyncRepositoryUseCase {
    pub fn new(tools: Arc<dyn RepoToolPort>, store: Arc<dyn PageStorePort>) -> Self {
        Self { tools, store }
    }

    /// Execute with default (no-op) progress.
    pub async fn execute(&self, input: SyncRepositoryInput) -> Result<SyncReport, SyncError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute with progress callbacks.
    pub async fn execute_with_progress(
        &self,
        input: SyncRepositoryInput,
        progress: &dyn SyncProgress,
    ) -> Result<SyncReport, SyncError> {
        info!("Syncing repository {}", input.repo);

        let mut report = SyncReport {
            repo: input.repo.full_name(),
            ..Default::default()
        };

        // Phase 1: resolve the repository — nothing to sync if this fails
        progress.on_phase_start(SyncPhase::RepositoryInfo, 1);
        self.fetch_repository_info(&input.repo).await?;
        progress.on_item_complete(SyncPhase::RepositoryInfo, &input.repo.full_name(), true);
        progress.on_phase_complete(SyncPhase::RepositoryInfo);

        // Phase 2: README first, so the most useful page lands even if the
        // tree walk goes badly
        progress.on_phase_start(SyncPhase::Readme, 1);
        let readme_stored = self.sync_file(&input.repo, "README.md", &mut report).await;
        progress.on_item_complete(SyncPhase::Readme, "README.md", readme_stored);
        progress.on_phase_complete(SyncPhase::Readme);

        // Phase 3: the file tree
        let mut seen = HashSet::new();
        seen.insert("README.md".to_string());
        let paths = self
            .collect_file_paths(&input.repo, &seen, &mut report)
            .await;
        progress.on_phase_start(SyncPhase::Files, paths.len());
        self.sync_files(&input, paths, &mut report, progress).await;
        progress.on_phase_complete(SyncPhase::Files);

        // Phases 4/5: issues and pull requests on request
        if input.include_issues {
            self.sync_items(&input.repo, PageKind::Issue, &mut report, progress)
                .await;
        }
        if input.include_pull_requests {
            self.sync_items(&input.repo, PageKind::PullRequest, &mut report, progress)
                .await;
        }

        info!(
            "Repository sync completed: {} items processed, {} skipped",
            report.processed,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Look up the repository via `search_repositories`.
    async fn fetch_repository_info(&self, repo: &RepoRef) -> Result<Value, SyncError> {
        let query = format!("repo:{}", repo.full_name());
        let result = self
            .tools
            .search_repositories(&query)
            .await
            .map_err(SyncError::Lookup)?;

        result
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .cloned()
            .ok_or_else(|| SyncError::RepositoryNotFound(repo.full_name()))
    }

    /// Walk the tree breadth-first, collecting documentation file paths.
    ///
    /// Directory listings are sequential (each level depends on the one
    /// above); the file fetches themselves fan out later.
    async fn collect_file_paths(
        &self,
        repo: &RepoRef,
        seen: &HashSet<String>,
        report: &mut SyncReport,
    ) -> Vec<String> {
        let mut queue = VecDeque::from([String::new()]);
        let mut paths = Vec::new();

        while let Some(dir) = queue.pop_front() {
            let listing = match self.tools.get_file_contents(repo, &dir).await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping directory {}: {}", display_dir(&dir), e);
                    report.record_skip(format!("dir {}: {}", display_dir(&dir), e));
                    continue;
                }
            };

            // A directory path yields an array of entries; anything else
            // (a lone file object) has no children to enqueue.
            let Some(entries) = listing.as_array() else {
                debug!("Path {} is not a directory listing", display_dir(&dir));
                continue;
            };

            for entry in entries {
                let path = entry.get("path").and_then(Value::as_str).unwrap_or_default();
                if path.is_empty() || path.starts_with(".git/") {
                    continue;
                }
                match entry.get("type").and_then(Value::as_str) {
                    Some("dir") => queue.push_back(path.to_string()),
                    Some("file")
                        if !seen.contains(path)
                            && !is_binary_path(path)
                            && is_documentation_path(path) =>
                    {
                        paths.push(path.to_string());
                    }
                    _ => {}
                }
            }
        }

        debug!("Collected {} documentation files", paths.len());
        paths
    }

    /// Fetch and store a single file; returns whether a page was stored.
    async fn sync_file(&self, repo: &RepoRef, path: &str, report: &mut SyncReport) -> bool {
        match build_file_page(self.tools.as_ref(), repo, path).await {
            Ok(page) => match self.store.save_page(&page).await {
                Ok(()) => {
                    report.record_page(PageKind::File);
                    debug!("Processed file: {}", path);
                    true
                }
                Err(e) => {
                    warn!("Could not store {}: {}", path, e);
                    report.record_skip(format!("{}: {}", path, e));
                    false
                }
            },
            Err(reason) => {
                warn!("Skipping {}: {}", path, reason);
                report.record_skip(format!("{}: {}", path, reason));
                false
            }
        }
    }

    /// Fetch and store files concurrently, bounded by a semaphore.
    async fn sync_files(
        &self,
        input: &SyncRepositoryInput,
        paths: Vec<String>,
        report: &mut SyncReport,
        progress: &dyn SyncProgress,
    ) {
        let semaphore = Arc::new(Semaphore::new(input.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for path in paths {
            let semaphore = Arc::clone(&semaphore);
            let tools = Arc::clone(&self.tools);
            let store = Arc::clone(&self.store);
            let repo = input.repo.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (path, Err("concurrency limiter closed".to_string()));
                };
                let outcome = match build_file_page(tools.as_ref(), &repo, &path).await {
                    Ok(page) => store.save_page(&page).await.map_err(|e| e.to_string()),
                    Err(reason) => Err(reason),
                };
                (path, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((path, Ok(()))) => {
                    report.record_page(PageKind::File);
                    progress.on_item_complete(SyncPhase::Files, &path, true);
                    debug!("Processed file: {}", path);
                }
                Ok((path, Err(reason))) => {
                    warn!("Skipping {}: {}", path, reason);
                    report.record_skip(format!("{}: {}", path, reason));
                    progress.on_item_complete(SyncPhase::Files, &path, false);
                }
                Err(e) => {
                    warn!("File sync task failed: {}", e);
                    report.record_skip(format!("file task: {}", e));
                }
            }
        }
    }

    /// Sync issues or pull requests: list, then fetch each item's detail
    /// with its own retry budget. A failed item is skipped, never fatal.
    async fn sync_items(
        &self,
        repo: &RepoRef,
        kind: PageKind,
        report: &mut SyncReport,
        progress: &dyn SyncProgress,
    ) {
        let (phase, label) = match kind {
            PageKind::Issue => (SyncPhase::Issues, "issue"),
            _ => (SyncPhase::PullRequests, "pull request"),
        };

        let listing = match kind {
            PageKind::Issue => self.tools.list_issues(repo, "all").await,
            _ => self.tools.list_pull_requests(repo, "all").await,
        };

        let listing = match listing {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not list {}s: {}", label, e);
                report.record_skip(format!("{}s: {}", label, e));
                return;
            }
        };

        let numbers = item_numbers(&listing);
        if numbers.is_empty() {
            info!("No {}s found for {}", label, repo.full_name());
            return;
        }

        progress.on_phase_start(phase, numbers.len());
        for number in numbers {
            let detail = match kind {
                PageKind::Issue => self.tools.get_issue(repo, number).await,
                _ => self.tools.get_pull_request(repo, number).await,
            };

            let outcome = match detail {
                Ok(detail) => {
                    let page = item_page(repo, number, &detail, kind);
                    self.store.save_page(&page).await.map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(()) => {
                    report.record_page(kind);
                    progress.on_item_complete(phase, &format!("#{number}"), true);
                    debug!("Processed {} #{}", label, number);
                }
                Err(reason) => {
                    warn!("Skipping {} #{}: {}", label, number, reason);
                    report.record_skip(format!("{} #{}: {}", label, number, reason));
                    progress.on_item_complete(phase, &format!("#{number}"), false);
                }
            }
        }
        progress.on_phase_complete(phase);
    }
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() { "(root)" } else { dir }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Extract item numbers from a listing payload (a bare array, or an object
/// wrapping one under `items`).
fn item_numbers(listing: &Value) -> Vec<u64> {
    let items = listing
        .as_array()
        .or_else(|| listing.get("items").and_then(Value::as_array));

    items
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("number").and_then(Value::as_u64))
                .collect()
        })
        .unwrap_or_default()
}

/// Fetch one file and build its page. The error string is suitable for the
/// report's skip list.
async fn build_file_page(
    tools: &dyn RepoToolPort,
    repo: &RepoRef,
    path: &str,
) -> Result<Page, String> {
    let result = tools
        .get_file_contents(repo, path)
        .await
        .map_err(|e| e.to_string())?;

    let content =
        decode_file_content(&result).ok_or_else(|| "empty or undecodable content".to_string())?;

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let mut metadata = PageMetadata::new(repo.full_name(), PageKind::File, now_rfc3339());
    metadata.path = Some(path.to_string());
    metadata.branch = Some(repo.branch.clone());
    metadata.sha = result.get("sha").and_then(Value::as_str).map(String::from);

    Ok(Page::new(
        repo.blob_url(path),
        format!("{} - {}", file_name, repo.full_name()),
        content,
        metadata,
    ))
}

/// Pull text content out of a `get_file_contents` payload, decoding base64
/// when the tool-server says so.
fn decode_file_content(result: &Value) -> Option<String> {
    let raw = result.get("content").and_then(Value::as_str)?;
    if raw.is_empty() {
        return None;
    }

    if result.get("encoding").and_then(Value::as_str) == Some("base64") {
        // The upstream API wraps base64 at 60 columns
        let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64.decode(cleaned.as_bytes()).ok()?;
        String::from_utf8(bytes).ok()
    } else {
        Some(raw.to_string())
    }
}

/// Build a page for one issue or pull request detail payload.
fn item_page(repo: &RepoRef, number: u64, detail: &Value, kind: PageKind) -> Page {
    let (default_title, url_segment) = match kind {
        PageKind::Issue => (format!("Issue #{number}"), "issues"),
        _ => (format!("Pull Request #{number}"), "pull"),
    };

    let title = detail
        .get("title")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or(default_title);
    let body = detail.get("body").and_then(Value::as_str).unwrap_or("");
    let url = detail
        .get("html_url")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| format!("{}/{}/{}", repo.html_url(), url_segment, number));

    let mut metadata = PageMetadata::new(repo.full_name(), kind, now_rfc3339());
    metadata.number = Some(number);
    metadata.state = detail.get("state").and_then(Value::as_str).map(String::from);
    metadata.labels = detail
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|l| l.get("name").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let content = format!("# {}\n\n{}", title, body);
    Page::new(url, title, content, metadata)
}
