//! Axum middleware that enforces a rate limit policy on a route.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::{trace, warn};

use super::error_response;
use crate::client_ip::{extract_client_identifier, scoped_identifier};
use crate::headers::apply_rate_limit_headers;
use crate::ratelimit::{Preset, RateLimitConfig, RateLimiterBackend};

/// Message returned in the 429 body unless overridden.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Too many requests. Please try again later.";

/// State for [`enforce`]: which backend, which scope, which limit.
#[derive(Clone)]
pub struct RateLimitGuard {
    backend: Arc<dyn RateLimiterBackend>,
    scope: Arc<str>,
    config: RateLimitConfig,
    message: Arc<str>,
}

impl RateLimitGuard {
    /// Guard requests under `scope` with an explicit configuration.
    pub fn new(
        backend: Arc<dyn RateLimiterBackend>,
        scope: impl Into<String>,
        config: RateLimitConfig,
    ) -> Self {
        Self {
            backend,
            scope: Arc::from(scope.into()),
            config,
            message: Arc::from(DEFAULT_REJECTION_MESSAGE),
        }
    }

    /// Guard requests with a built-in preset, scoped by the preset name.
    pub fn preset(backend: Arc<dyn RateLimiterBackend>, preset: Preset) -> Self {
        Self::new(backend, preset.name(), preset.config())
    }

    /// Replace the message sent with 429 responses.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Arc::from(message.into());
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Check the caller against the guard's policy before running the route.
///
/// Use with `axum::middleware::from_fn_with_state`. Allowed responses carry
/// the rate limit headers; rejected requests get `429` with a JSON error.
pub async fn enforce(State(guard): State<RateLimitGuard>, request: Request, next: Next) -> Response {
    let client = extract_client_identifier(request.headers());
    let identifier = scoped_identifier(&guard.scope, &client);
    let result = guard.backend.check(&identifier, &guard.config);

    if !result.success {
        warn!(
            identifier = %identifier,
            retry_after = ?result.retry_after,
            "Rejecting rate limited request"
        );
        let mut response = error_response(StatusCode::TOO_MANY_REQUESTS, &*guard.message);
        apply_rate_limit_headers(&result, response.headers_mut());
        return response;
    }

    trace!(identifier = %identifier, remaining = result.remaining, "Request admitted");

    let mut response = next.run(request).await;
    apply_rate_limit_headers(&result, response.headers_mut());
    response
}
