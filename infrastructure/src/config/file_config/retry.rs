//! Retry configuration from TOML (`[retry]` section)

use harvest_domain::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[retry]` section — the single named retry policy applied by the
/// domain client across all call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub backoff_seconds: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_seconds: 2.0,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs_f64(self.backoff_seconds.max(0.0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_backoff_clamps_to_zero() {
        let config = FileRetryConfig {
            max_attempts: 3,
            backoff_seconds: -1.0,
        };
        assert_eq!(config.to_policy().backoff, Duration::ZERO);
    }

    #[test]
    fn default_matches_policy_default() {
        assert_eq!(FileRetryConfig::default().to_policy(), RetryPolicy::default());
    }
}
