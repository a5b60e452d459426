//! Exponential backoff with jitter between failover attempts.

use std::time::Duration;
use rand::Rng;

use crate::config::BackoffConfig;

/// Delay schedule applied after a failed attempt.
///
/// A zero base delay disables sleeping entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_ms: u64,
    max_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Retry immediately.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }

    pub fn delay(&self, failed_attempts: u32) -> Duration {
        calculate_backoff(failed_attempts, self.base_ms, self.max_ms)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Calculate exponential backoff delay with up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
