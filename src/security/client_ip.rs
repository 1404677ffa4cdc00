//! Client identifier resolution.
//!
//! Rate and abuse counters are keyed by the client IP as reported by the
//! fronting proxy. Key-gated API routes use the API key value instead (see
//! the apikeys module), so per-key and per-IP quotas never merge.

use axum::http::HeaderMap;

/// Fallback identifier when no address header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client IP from proxy headers.
///
/// Precedence: first entry of `X-Forwarded-For` (comma-split, trimmed), then
/// `X-Real-IP`, then the literal `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded_for.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }

    UNKNOWN_CLIENT.to_string()
}
