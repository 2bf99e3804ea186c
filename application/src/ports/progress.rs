//! Sync progress port
//!
//! Defines the interface for reporting progress during a repository sync.
//! Implementations live in the presentation layer.

/// Phases of a repository sync, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    RepositoryInfo,
    Readme,
    Files,
    Issues,
    PullRequests,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::RepositoryInfo => "repository info",
            SyncPhase::Readme => "readme",
            SyncPhase::Files => "files",
            SyncPhase::Issues => "issues",
            SyncPhase::PullRequests => "pull requests",
        }
    }
}

/// Callback for progress updates during a sync.
pub trait SyncProgress: Send + Sync {
    /// Called when a phase starts, with the number of items known up front
    /// (0 when the count is discovered as the phase runs).
    fn on_phase_start(&self, phase: SyncPhase, total_items: usize);

    /// Called when one item within a phase finishes (stored or skipped).
    fn on_item_complete(&self, phase: SyncPhase, item: &str, success: bool);

    /// Called when a phase completes.
    fn on_phase_complete(&self, phase: SyncPhase);
}

/// No-op progress notifier for when progress reporting is not needed.
pub struct NoProgress;

impl SyncProgress for NoProgress {
    fn on_phase_start(&self, _phase: SyncPhase, _total_items: usize) {}
    fn on_item_complete(&self, _phase: SyncPhase, _item: &str, _success: bool) {}
    fn on_phase_complete(&self, _phase: SyncPhase) {}
}
