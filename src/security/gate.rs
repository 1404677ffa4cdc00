//! Security middleware: block gate → rate limiter → abuse detector.
//!
//! Public routes bypass every check. Store errors fail open for this layer:
//! the request proceeds with a warning instead of turning a store outage into
//! a full denial of service. Request-scoped validation paths (the API-key
//! tier) make the opposite choice and surface a 500.

use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::GateError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::rate_limit::RateLimitDecision;
use crate::security::{abuse, block, client_ip, rate_limit};
use crate::store::{KvStore, StoreError};

enum Gate {
    Deny(Response),
    Allow(Request<Body>, RateLimitDecision),
}

/// Middleware applying the per-IP security checks in order.
pub async fn security_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    // Public routes bypass all security checks: no counters move.
    if state.routes.is_public(&path) {
        let response = next.run(request).await;
        return finish(&method, start, response);
    }

    let Some(store) = state.kv.clone() else {
        tracing::warn!("Counter store not configured - security checks disabled");
        let response = next.run(request).await;
        return finish(&method, start, response);
    };

    let ip = client_ip(request.headers());

    match run_checks(store.as_ref(), &state, &ip, request).await {
        Ok(Gate::Deny(response)) => finish(&method, start, response),
        Ok(Gate::Allow(request, decision)) => {
            let mut response = next.run(request).await;
            set_rate_limit_headers(&mut response, &state, &decision);
            finish(&method, start, response)
        }
        Err((request, e)) => {
            tracing::warn!(error = %e, client = %ip, "Security check failed - failing open");
            let response = next.run(request).await;
            finish(&method, start, response)
        }
    }
}

async fn run_checks(
    store: &dyn KvStore,
    state: &AppState,
    ip: &str,
    request: Request<Body>,
) -> Result<Gate, (Request<Body>, StoreError)> {
    let security = &state.config.security;

    // 1. Block gate. Checked first so blocked traffic has zero side effects
    // on window or failure counters.
    match block::is_blocked(store, ip).await {
        Ok(true) => {
            tracing::debug!(client = %ip, "Request from blocked client rejected");
            metrics::record_blocked();
            return Ok(Gate::Deny(GateError::Blocked.into_response()));
        }
        Ok(false) => {}
        Err(e) => return Err((request, e)),
    }

    // 2. Fixed-window rate limit. A breach creates a block as a side effect.
    let decision = match rate_limit::check_fixed_window(store, ip, security).await {
        Ok(decision) => decision,
        Err(e) => return Err((request, e)),
    };
    if !decision.allowed {
        metrics::record_rate_limited();
        let mut response = GateError::Blocked.into_response();
        set_rate_limit_headers(&mut response, state, &decision);
        return Ok(Gate::Deny(response));
    }

    // 3. Abuse detection over the URL and the actual body bytes.
    let url = request.uri().to_string();
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, security.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Ok(Gate::Deny(
                (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response(),
            ));
        }
    };
    let request = Request::from_parts(parts, Body::from(bytes.clone()));

    if abuse::is_suspicious(&url, &bytes) {
        metrics::record_suspicious();
        match abuse::record_failure(store, ip, security).await {
            Ok(count) if count >= security.max_failed_attempts => {
                tracing::warn!(client = %ip, count, "Abuse threshold reached - blocking client");
                if let Err(e) = block::block(
                    store,
                    ip,
                    std::time::Duration::from_secs(security.block_duration_secs),
                )
                .await
                {
                    tracing::warn!(error = %e, client = %ip, "Failed to persist abuse block");
                }
                return Ok(Gate::Deny(GateError::SuspiciousActivity.into_response()));
            }
            Ok(count) => {
                tracing::debug!(client = %ip, count, url = %url, "Suspicious request below threshold");
            }
            Err(e) => return Err((request, e)),
        }
    }

    Ok(Gate::Allow(request, decision))
}

fn set_rate_limit_headers(response: &mut Response, state: &AppState, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    if let Ok(limit) = HeaderValue::from_str(&state.config.security.max_requests.to_string()) {
        headers.insert("x-ratelimit-limit", limit);
    }
    if let Ok(remaining) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", remaining);
    }
    if let Ok(reset) = HeaderValue::from_str(&decision.reset.to_rfc3339()) {
        headers.insert("x-ratelimit-reset", reset);
    }
}

fn finish(method: &str, start: Instant, response: Response) -> Response {
    metrics::record_request(method, response.status().as_u16(), start);
    response
}
