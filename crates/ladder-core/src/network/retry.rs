//! Rate-limit retry policy
//!
//! Delays are computed by the pure function [`retry_delay`] so the policy can
//! be tested without timers.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::config::TrackerConfig;

/// Retry settings for HTTP 429 responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub hint_padding: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
            hint_padding: config.retry_hint_padding,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        retry_delay(attempt, hint, self.base_delay, self.hint_padding)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

/// Delay before retry number `attempt` (1-based)
///
/// A server hint wins and is padded; otherwise the delay grows linearly
/// (`attempt * base`).
pub fn retry_delay(
    attempt: u32,
    hint: Option<Duration>,
    base: Duration,
    padding: Duration,
) -> Duration {
    match hint {
        Some(hint) => hint.saturating_add(padding),
        None => base.saturating_mul(attempt.max(1)),
    }
}

/// Read a delta-seconds `Retry-After` header
///
/// HTTP-date values are ignored and fall back to the backoff schedule.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
