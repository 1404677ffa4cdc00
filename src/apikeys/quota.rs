//! Sliding-window quota for the API-key tier.
//!
//! Unlike the security tier's fixed window, this is a true sliding log: each
//! granted request is recorded in a sorted set scored by its timestamp, and
//! the quota counts entries in `[now - window, now]`. The set expires a full
//! window after its last write, so idle keys cost nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ApiQuotaConfig;
use crate::store::{KvStore, StoreError};

/// Outcome of a sliding-window quota check.
#[derive(Debug, Clone)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

fn quota_key(api_key: &str) -> String {
    format!("rate_limit:{api_key}")
}

/// Check the key's window and, when allowed, record this request in it.
pub async fn check_sliding_window(
    store: &dyn KvStore,
    api_key: &str,
    config: &ApiQuotaConfig,
) -> Result<QuotaDecision, StoreError> {
    let key = quota_key(api_key);
    let now = Utc::now();
    let now_ms = now.timestamp_millis();
    let window_ms = config.window_secs as i64 * 1000;
    let reset = now + chrono::Duration::seconds(config.window_secs as i64);

    let count = store.zcount(&key, now_ms - window_ms, now_ms).await?;
    if count >= config.max_requests {
        return Ok(QuotaDecision {
            allowed: false,
            remaining: 0,
            reset,
        });
    }

    // Member carries a nonce so two grants in the same millisecond both count
    let member = format!("{now_ms}:{}", Uuid::new_v4());
    store.zadd(&key, now_ms, &member).await?;
    store.expire(&key, Duration::from_secs(config.window_secs)).await?;

    Ok(QuotaDecision {
        allowed: true,
        remaining: config.max_requests - count - 1,
        reset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config(max_requests: u64) -> ApiQuotaConfig {
        ApiQuotaConfig {
            max_requests,
            ..ApiQuotaConfig::default()
        }
    }

    #[tokio::test]
    async fn grants_until_the_limit_then_denies() {
        let store = MemoryStore::new();
        let config = config(3);
        for expected in [2, 1, 0] {
            let decision = check_sliding_window(&store, "nuro_abc123", &config).await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected);
        }
        let decision = check_sliding_window(&store, "nuro_abc123", &config).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn denied_requests_are_not_recorded() {
        let store = MemoryStore::new();
        let config = config(1);
        assert!(check_sliding_window(&store, "k", &config).await.unwrap().allowed);
        for _ in 0..3 {
            assert!(!check_sliding_window(&store, "k", &config).await.unwrap().allowed);
        }
        // Still exactly one recorded grant in the window
        let now_ms = Utc::now().timestamp_millis();
        let count = store.zcount("rate_limit:k", 0, now_ms).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn keys_have_independent_windows() {
        let store = MemoryStore::new();
        let config = config(1);
        assert!(check_sliding_window(&store, "a", &config).await.unwrap().allowed);
        assert!(check_sliding_window(&store, "b", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn same_millisecond_grants_both_count() {
        let store = MemoryStore::new();
        let config = config(2);
        assert!(check_sliding_window(&store, "k", &config).await.unwrap().allowed);
        assert!(check_sliding_window(&store, "k", &config).await.unwrap().allowed);
        assert!(!check_sliding_window(&store, "k", &config).await.unwrap().allowed);
    }
}
