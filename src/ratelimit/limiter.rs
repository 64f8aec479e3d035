//! Core rate limiter implementation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::entry::{RateLimitEntry, RateLimitResult};
use super::policies::RateLimitConfig;

/// Fixed-window rate limiter over an in-memory store.
///
/// Each identifier owns at most one live [`RateLimitEntry`]. The store is
/// local to this instance: running several processes multiplies the
/// effective limit by the number of processes.
///
/// This struct is thread-safe and can be shared across multiple tasks. The
/// read-modify-write for an identifier runs under the store's entry lock, so
/// concurrent requests for the same identifier are serialized.
pub struct RateLimiter<C: Clock = SystemClock> {
    /// Window state indexed by identifier
    entries: DashMap<String, RateLimitEntry>,
    /// Source of the current time
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a new rate limiter using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a new rate limiter reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Record a request for `identifier` and decide whether it may proceed.
    ///
    /// The first request of a window always succeeds. The request that pushes
    /// the count past `max_requests` is still recorded.
    pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.now_millis();

        trace!(
            identifier = %identifier,
            max_requests = config.max_requests,
            window_seconds = config.window_seconds,
            "Checking rate limit"
        );

        match self.entries.entry(identifier.to_string()) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let entry = occupied.get_mut();
                entry.count += 1;

                if entry.count > config.max_requests {
                    let retry_after = entry.seconds_until_reset(now);
                    debug!(
                        identifier = %identifier,
                        count = entry.count,
                        limit = config.max_requests,
                        retry_after = retry_after,
                        "Rate limit exceeded"
                    );
                    RateLimitResult::rejected(entry.reset_time, retry_after)
                } else {
                    RateLimitResult::allowed(config.max_requests - entry.count, entry.reset_time)
                }
            }
            slot => {
                let entry = RateLimitEntry::start(now, config.window_millis());
                match slot {
                    Entry::Occupied(mut occupied) => {
                        occupied.insert(entry);
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(entry);
                    }
                }
                RateLimitResult::allowed(config.max_requests.saturating_sub(1), entry.reset_time)
            }
        }
    }

    /// Remove every entry whose window has already ended.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            debug!(
                removed_entries = removed,
                remaining_entries = self.entries.len(),
                "Rate limiter sweep completed"
            );
        }
        removed
    }

    /// Get the stored window state for an identifier.
    pub fn entry(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|entry| *entry)
    }

    /// Forget an identifier, starting it on a fresh window next time.
    pub fn reset(&self, identifier: &str) -> bool {
        self.entries.remove(identifier).is_some()
    }

    /// Clear all entries.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}
