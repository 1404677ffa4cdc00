//! Block gate.
//!
//! A block is a TTL-bound denial state for an identifier, stronger than any
//! quota check. It is created by the rate limiter on quota breach or by the
//! abuse detector on repeated detection, and destroyed only by key expiry.

use std::time::Duration;

use crate::store::{KvStore, StoreError};

fn blocked_key(identifier: &str) -> String {
    format!("blocked:{identifier}")
}

/// True iff a non-expired block exists for the identifier.
///
/// Must be consulted before any counter is incremented so that blocked
/// traffic causes zero side effects.
pub async fn is_blocked(store: &dyn KvStore, identifier: &str) -> Result<bool, StoreError> {
    Ok(store.get(&blocked_key(identifier)).await?.is_some())
}

/// Create (or refresh) a block for the identifier.
pub async fn block(
    store: &dyn KvStore,
    identifier: &str,
    duration: Duration,
) -> Result<(), StoreError> {
    store.set_ex(&blocked_key(identifier), "true", duration).await
}
