//! Response headers describing a rate limit decision.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

use crate::ratelimit::RateLimitResult;

pub const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RESET_HEADER: &str = "X-RateLimit-Reset";
pub const RETRY_AFTER_HEADER: &str = "Retry-After";

/// Build the rate limit headers for a check result.
///
/// Remaining and reset (Unix seconds, rounded up) are always present;
/// `Retry-After` only when the request was rejected.
pub fn rate_limit_headers(result: &RateLimitResult) -> BTreeMap<&'static str, String> {
    let mut headers = BTreeMap::new();
    headers.insert(REMAINING_HEADER, result.remaining.to_string());
    headers.insert(RESET_HEADER, result.reset_time_secs().to_string());

    if let Some(retry_after) = result.retry_after {
        headers.insert(RETRY_AFTER_HEADER, retry_after.to_string());
    }

    headers
}

/// Write the rate limit headers for `result` into `headers`.
pub fn apply_rate_limit_headers(result: &RateLimitResult, headers: &mut HeaderMap) {
    for (name, value) in rate_limit_headers(result) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::try_from(value),
        ) {
            headers.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_headers() {
        let result = RateLimitResult::allowed(5, 1_700_000_000_000);
        let headers = rate_limit_headers(&result);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-RateLimit-Remaining"], "5");
        assert_eq!(headers["X-RateLimit-Reset"], "1700000000");
        assert!(!headers.contains_key("Retry-After"));
    }

    #[test]
    fn test_rejected_headers() {
        let result = RateLimitResult::rejected(1_700_000_000_500, 30);
        let headers = rate_limit_headers(&result);

        assert_eq!(headers["X-RateLimit-Remaining"], "0");
        assert_eq!(headers["X-RateLimit-Reset"], "1700000001");
        assert_eq!(headers["Retry-After"], "30");
    }

    #[test]
    fn test_apply_to_header_map() {
        let mut map = HeaderMap::new();
        apply_rate_limit_headers(&RateLimitResult::rejected(1_700_000_000_000, 12), &mut map);

        assert_eq!(map.get("x-ratelimit-remaining").unwrap(), "0");
        assert_eq!(map.get("X-RateLimit-Reset").unwrap(), "1700000000");
        assert_eq!(map.get("retry-after").unwrap(), "12");

        let mut map = HeaderMap::new();
        apply_rate_limit_headers(&RateLimitResult::allowed(4, 1_700_000_000_000), &mut map);
        assert!(map.get("retry-after").is_none());
    }
}
