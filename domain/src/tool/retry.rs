//! Retry policy — a named, overridable bound on repeated attempts.
//!
//! Applied uniformly across call sites instead of scattering magic
//! constants per call. The policy itself is configuration only; the loop
//! that applies it lives with the domain client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many times to attempt an exchange and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts (the first try included). Always >= 1.
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Policy that tries exactly once with no backoff.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Whether `attempt` (1-based) leaves room for another try.
    pub fn has_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    /// Three attempts with a two second backoff.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}
