//! Fixed-window rate limiting for the security tier.
//!
//! Each identifier gets a counter that starts at its first request and
//! expires after the window length; the window is deliberately not aligned
//! to wall-clock boundaries. Breaching the quota escalates straight to a
//! block, so the (max + 1)-th request and everything after it within the
//! block TTL is rejected.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::SecurityConfig;
use crate::security::block;
use crate::store::{KvStore, StoreError};

/// Outcome of a fixed-window quota check.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// False when the quota was breached (a block has been created).
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u64,
    /// When the current window rolls over.
    pub reset: DateTime<Utc>,
}

fn requests_key(identifier: &str) -> String {
    format!("requests:{identifier}")
}

/// Count this request against the identifier's window.
///
/// INCR is atomic in the store, so concurrent requests from one identifier
/// never under-count. A post-increment value of 1 means the counter was just
/// created and its expiry must be set.
pub async fn check_fixed_window(
    store: &dyn KvStore,
    identifier: &str,
    config: &SecurityConfig,
) -> Result<RateLimitDecision, StoreError> {
    let window = Duration::from_secs(config.rate_limit_window_secs);
    let count = store.incr(&requests_key(identifier)).await?;
    if count == 1 {
        store.expire(&requests_key(identifier), window).await?;
    }

    if count > config.max_requests {
        block::block(
            store,
            identifier,
            Duration::from_secs(config.block_duration_secs),
        )
        .await?;
        tracing::warn!(client = %identifier, count, "Rate limit exceeded - blocking client");
        return Ok(RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset: Utc::now() + chrono::Duration::seconds(config.block_duration_secs as i64),
        });
    }

    Ok(RateLimitDecision {
        allowed: true,
        remaining: config.max_requests - count,
        reset: Utc::now() + chrono::Duration::seconds(config.rate_limit_window_secs as i64),
    })
}
