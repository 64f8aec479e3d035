//! Background task that evicts expired rate limit entries.
//!
//! Expiry is otherwise only noticed when an identifier is seen again, so
//! identifiers that never come back would stay in the store forever.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::limiter::RateLimiter;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running sweep task.
///
/// The task stops when [`Sweeper::shutdown`] is called or the handle is
/// dropped.
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn a task sweeping `limiter` every `interval`.
    ///
    /// Must be called from within a tokio runtime. The first sweep runs one
    /// full interval after spawning.
    pub fn spawn<C>(limiter: Arc<RateLimiter<C>>, interval: Duration) -> Self
    where
        C: Clock + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_ms = interval.as_millis() as u64, "Rate limit sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep();
                        debug!(removed = removed, tracked = limiter.len(), "Sweep tick");
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Rate limit sweeper stopped");
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop the sweep task and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Rate limit sweeper task failed");
            }
        }
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;
    use crate::ratelimit::policies::RateLimitConfig;

    fn limiter_at(ms: i64) -> (Arc<ManualClock>, Arc<RateLimiter<Arc<ManualClock>>>) {
        let clock = Arc::new(ManualClock::new(ms));
        let limiter = Arc::new(RateLimiter::with_clock(Arc::clone(&clock)));
        (clock, limiter)
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_entries() {
        let (clock, limiter) = limiter_at(0);
        limiter.check("one-shot", &RateLimitConfig::new(5, 1));
        limiter.check("regular", &RateLimitConfig::new(5, 600));
        clock.advance(Duration::from_secs(2));

        let sweeper = Sweeper::spawn(Arc::clone(&limiter), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(limiter.entry("one-shot").is_none());
        assert!(limiter.entry("regular").is_some());

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_waits_one_interval() {
        let (clock, limiter) = limiter_at(0);
        limiter.check("key", &RateLimitConfig::new(5, 1));
        clock.advance(Duration::from_secs(2));

        let sweeper = Sweeper::spawn(Arc::clone(&limiter), Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(limiter.len(), 1);
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_shutdown_stops_task() {
        let (_clock, limiter) = limiter_at(0);
        let sweeper = Sweeper::spawn(limiter, DEFAULT_SWEEP_INTERVAL);
        assert!(sweeper.is_running());

        tokio_test::assert_ok!(
            tokio::time::timeout(Duration::from_secs(1), sweeper.shutdown()).await
        );
    }
}
