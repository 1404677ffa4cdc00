//! Counter and block storage subsystem.
//!
//! # Data Flow
//! ```text
//! security middleware ──┐
//! API-key quota ────────┼──▶ KvStore trait ──▶ redis.rs (distributed)
//! security event log ───┘                  └─▶ memory.rs (single node, tests)
//! ```
//!
//! # Design Decisions
//! - All mutual exclusion is delegated to the store's atomic primitives;
//!   no in-process locks are taken around quota decisions
//! - The store is injected as `Arc<dyn KvStore>`, never accessed as a global
//! - A missing store means the security layer fails open, not that it panics

pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::config::{StoreBackend, StoreConfig};

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[from] ::redis::RedisError),

    #[error("store error: {0}")]
    Internal(String),
}

/// Atomic key-value operations required by the gatekeeper.
///
/// Counters and blocks are plain keys with TTLs; the API-key quota uses a
/// sorted set keyed by timestamp; the security event log is a capped list.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Atomically increment a counter, creating it at 1 if absent.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Set the TTL of an existing key.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Fetch a string value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a string value with a TTL in one atomic step.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Add a member to a sorted set with the given score.
    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError>;

    /// Count members of a sorted set with scores in `[min, max]`.
    async fn zcount(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError>;

    /// Push a value onto the head of a list, keeping at most `keep` entries.
    async fn lpush_trim(&self, key: &str, value: &str, keep: usize) -> Result<(), StoreError>;

    /// Read a range of a list, head first (inclusive indices, redis LRANGE).
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, StoreError>;
}

/// Build the configured KV backend.
///
/// `None` means security checks run in fail-open mode: the caller is expected
/// to log the degradation and let traffic through.
pub async fn build_kv_store(config: &StoreConfig) -> Option<Arc<dyn KvStore>> {
    match config.backend {
        StoreBackend::Memory => Some(Arc::new(MemoryStore::new()) as Arc<dyn KvStore>),
        StoreBackend::Redis => match RedisStore::connect(&config.redis_url).await {
            Ok(store) => Some(Arc::new(store) as Arc<dyn KvStore>),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    redis_url = %config.redis_url,
                    "Failed to connect to redis - security checks disabled"
                );
                None
            }
        },
        StoreBackend::Disabled => {
            tracing::warn!("Counter store disabled - security checks disabled");
            None
        }
    }
}
