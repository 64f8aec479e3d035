//! Rate limit check service.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::error_response;
use super::middleware::DEFAULT_REJECTION_MESSAGE;
use crate::client_ip::{extract_client_identifier, scoped_identifier};
use crate::headers::apply_rate_limit_headers;
use crate::ratelimit::{PolicySet, RateLimitResult, RateLimiterBackend};

/// Shared state for the check service.
#[derive(Clone)]
pub struct AppState {
    /// The rate limiter instance
    pub backend: Arc<dyn RateLimiterBackend>,
    /// Named policies callers can check against
    pub policies: Arc<PolicySet>,
}

impl AppState {
    pub fn new(backend: Arc<dyn RateLimiterBackend>, policies: PolicySet) -> Self {
        Self {
            backend,
            policies: Arc::new(policies),
        }
    }
}

/// Body of a check request.
///
/// When `identifier` is omitted the caller's client address is derived
/// from the forwarding headers.
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub identifier: Option<String>,
}

/// Body of a check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(flatten)]
    pub result: RateLimitResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the service router.
///
/// * `GET /healthz`
/// * `POST /v1/check/{policy}`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/v1/check/{policy}", post(check_policy))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Record a request against the named policy.
///
/// Answers `200` when allowed and `429` when rejected, both with the result
/// body and rate limit headers, so callers can relay them unchanged.
#[instrument(skip_all)]
async fn check_policy(
    State(state): State<AppState>,
    Path(policy): Path<String>,
    headers: HeaderMap,
    body: Option<Json<CheckRequest>>,
) -> Response {
    let Some(config) = state.policies.get(&policy).copied() else {
        warn!(policy = %policy, "Received check for unknown policy");
        return error_response(
            StatusCode::NOT_FOUND,
            format!("unknown rate limit policy: {}", policy),
        );
    };

    let client = body
        .and_then(|Json(req)| req.identifier)
        .filter(|identifier| !identifier.is_empty())
        .unwrap_or_else(|| extract_client_identifier(&headers));
    let identifier = scoped_identifier(&policy, &client);

    debug!(policy = %policy, identifier = %identifier, "Processing rate limit check");

    let result = state.backend.check(&identifier, &config);

    let (status, error) = if result.success {
        (StatusCode::OK, None)
    } else {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Some(DEFAULT_REJECTION_MESSAGE.to_string()),
        )
    };

    info!(
        identifier = %identifier,
        success = result.success,
        remaining = result.remaining,
        "Rate limit decision made"
    );

    let mut response = (status, Json(CheckResponse { result, error })).into_response();
    apply_rate_limit_headers(&result, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{RateLimitConfig, RateLimiter};

    async fn spawn_service(policies: PolicySet) -> String {
        let state = AppState::new(Arc::new(RateLimiter::new()), policies);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_service(PolicySet::default()).await;
        let body: serde_json::Value = reqwest::get(format!("{}/healthz", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_fourth_request() {
        let base = spawn_service(PolicySet::default()).await;
        let client = reqwest::Client::new();
        let url = format!("{}/v1/check/strict", base);

        for expected in [2, 1, 0] {
            let response = client
                .post(&url)
                .json(&serde_json::json!({ "identifier": "203.0.113.4" }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let body: serde_json::Value = response.json().await.unwrap();
            assert_eq!(body["success"], true);
            assert_eq!(body["remaining"], expected);
            assert!(body.get("retryAfter").is_none());
        }

        let response = client
            .post(&url)
            .json(&serde_json::json!({ "identifier": "203.0.113.4" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        let retry_after: u64 = response.headers()["retry-after"].to_str().unwrap().parse().unwrap();
        assert!(retry_after > 0 && retry_after <= 60);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], DEFAULT_REJECTION_MESSAGE);
        assert_eq!(body["retryAfter"], retry_after);
    }

    #[tokio::test]
    async fn test_identifier_falls_back_to_headers() {
        let mut policies = PolicySet::empty();
        policies.insert("once", RateLimitConfig::new(1, 60));
        let base = spawn_service(policies).await;
        let client = reqwest::Client::new();
        let url = format!("{}/v1/check/once", base);

        let first = client.post(&url).header("x-forwarded-for", "198.51.100.7, 10.0.0.1").send().await.unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::OK);

        // Same client named explicitly shares the window
        let second = client
            .post(&url)
            .json(&serde_json::json!({ "identifier": "198.51.100.7" }))
            .send()
            .await
            .unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_unknown_policy() {
        let base = spawn_service(PolicySet::default()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/v1/check/billing", base))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "unknown rate limit policy: billing");
    }
}
