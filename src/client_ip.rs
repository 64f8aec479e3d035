//! Client identity extraction for rate limit keys.
//!
//! The values read here come from request headers, which any client can set
//! unless a trusted proxy overwrites them. Use the result for abuse
//! mitigation only, never for authentication.

use axum::http::HeaderMap;

/// Returned when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive a best-effort client identity from request headers.
///
/// Headers are consulted in a fixed order and the first one present wins:
/// `x-forwarded-for` (first hop), `x-real-ip`, then `x-vercel-forwarded-for`
/// (first hop).
pub fn extract_client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        return first_hop(forwarded);
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    if let Some(vercel) = header_str(headers, "x-vercel-forwarded-for") {
        return first_hop(vercel);
    }

    UNKNOWN_CLIENT.to_string()
}

/// Build a rate limit key namespaced by operation, e.g. `submissions:203.0.113.4`.
pub fn scoped_identifier(scope: &str, client: &str) -> String {
    format!("{}:{}", scope, client)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn first_hop(list: &str) -> String {
    list.split(',').next().unwrap_or_default().trim().to_string()
}
