//! Security event log.
//!
//! Advisory audit trail of gated requests, kept in the counter store as a
//! capped list. Logging failures are swallowed with a warning; the log never
//! affects the fate of a request.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::KvStore;

const LOG_KEY: &str = "security_logs";
const LOG_CAPACITY: usize = 10_000;

/// One gated request, as recorded in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub action: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub path: String,
    pub method: String,
    pub status_code: u16,
}

impl SecurityEvent {
    pub fn request(ip: String, user_id: Option<String>, path: String, method: String) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            action: "request".to_string(),
            ip,
            user_id,
            path,
            method,
            status_code: 200,
        }
    }
}

/// Append an event to the capped log.
pub async fn record(store: &dyn KvStore, event: &SecurityEvent) {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize security event");
            return;
        }
    };
    if let Err(e) = store.lpush_trim(LOG_KEY, &payload, LOG_CAPACITY).await {
        tracing::warn!(error = %e, "Failed to record security event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn events_serialize_without_missing_user() {
        let store = MemoryStore::new();
        let event = SecurityEvent::request(
            "1.2.3.4".to_string(),
            None,
            "/dashboard".to_string(),
            "GET".to_string(),
        );
        record(&store, &event).await;

        let payload = serde_json::to_string(&event).unwrap();
        assert!(!payload.contains("user_id"));
        assert!(payload.contains("\"action\":\"request\""));
    }
}
