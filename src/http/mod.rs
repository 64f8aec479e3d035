//! HTTP surface for the rate limiter.
//!
//! Two ways in: [`middleware::enforce`] guards axum routes in-process, and
//! [`service::router`] exposes checks to other processes over HTTP.

pub mod middleware;
pub mod server;
pub mod service;

pub use middleware::{enforce, RateLimitGuard};
pub use server::{BoundHttpServer, HttpServer};
pub use service::{router, AppState};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body for error responses: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
