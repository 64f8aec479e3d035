//! Rate limit entry and check result types.

use serde::{Deserialize, Serialize};

/// Per-identifier state for the current fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests observed in the current window
    pub count: u64,
    /// When the current window expires (Unix milliseconds)
    pub reset_time: i64,
}

impl RateLimitEntry {
    /// Start a new window at `now` holding a single request.
    pub fn start(now: i64, window_millis: i64) -> Self {
        Self {
            count: 1,
            reset_time: now.saturating_add(window_millis),
        }
    }

    /// Whether the window ended before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.reset_time < now
    }

    /// Whole seconds until the window resets, rounded up.
    pub fn seconds_until_reset(&self, now: i64) -> u64 {
        let millis = self.reset_time.saturating_sub(now).max(0) as u64;
        millis.div_ceil(1000)
    }
}

/// The outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub success: bool,
    /// Requests left in the current window
    pub remaining: u64,
    /// When the window resets (Unix milliseconds)
    pub reset_time: i64,
    /// Seconds to wait before retrying; only set on rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl RateLimitResult {
    /// An allowed request.
    pub fn allowed(remaining: u64, reset_time: i64) -> Self {
        Self {
            success: true,
            remaining,
            reset_time,
            retry_after: None,
        }
    }

    /// A rejected request.
    pub fn rejected(reset_time: i64, retry_after: u64) -> Self {
        Self {
            success: false,
            remaining: 0,
            reset_time,
            retry_after: Some(retry_after),
        }
    }

    /// Reset time as a Unix timestamp in whole seconds, rounded up.
    pub fn reset_time_secs(&self) -> i64 {
        self.reset_time.div_euclid(1000) + i64::from(self.reset_time.rem_euclid(1000) != 0)
    }
}
