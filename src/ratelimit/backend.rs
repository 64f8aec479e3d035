//! Rate limiter trait for abstracting over store implementations.

use super::clock::Clock;
use super::entry::RateLimitResult;
use super::limiter::RateLimiter;
use super::policies::RateLimitConfig;

/// Trait for rate limiter implementations.
///
/// Request handlers depend on this trait rather than on the in-memory
/// [`RateLimiter`], so a shared store could be substituted without touching
/// them.
pub trait RateLimiterBackend: Send + Sync {
    /// Record a request for `identifier` and decide whether it may proceed.
    fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult;
}

impl<C: Clock> RateLimiterBackend for RateLimiter<C> {
    fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        RateLimiter::check(self, identifier, config)
    }
}

impl<B: RateLimiterBackend + ?Sized> RateLimiterBackend for std::sync::Arc<B> {
    fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        (**self).check(identifier, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_backend_trait_object() {
        let backend: Arc<dyn RateLimiterBackend> = Arc::new(RateLimiter::new());
        let config = RateLimitConfig::new(1, 60);

        assert!(backend.check("key", &config).success);
        assert!(!backend.check("key", &config).success);
    }
}
