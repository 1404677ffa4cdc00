//! Suspicious-request detection and escalation.
//!
//! The pattern set is fixed: directory traversal, script injection, SQL
//! injection, command injection. Detection alone is non-blocking; only
//! repeated detection within the failure counter's TTL escalates to a block.
//!
//! The scan runs over the request URL and the actual buffered body bytes.

use std::time::Duration;

use crate::config::SecurityConfig;
use crate::store::{KvStore, StoreError};

/// True iff the URL or body matches any suspicious pattern.
pub fn is_suspicious(url: &str, body: &[u8]) -> bool {
    let url = url.to_ascii_lowercase();
    let body = String::from_utf8_lossy(body).to_ascii_lowercase();

    matches_patterns(&url) || matches_patterns(&body)
}

fn matches_patterns(haystack: &str) -> bool {
    haystack.contains("..")          // directory traversal
        || haystack.contains("<script") // XSS attempts
        || contains_union_select(haystack) // SQL injection
        || haystack.contains("exec(") // command injection
}

/// Matches "union" followed by at least one whitespace character and
/// "select", anywhere in the (already lowercased) haystack.
fn contains_union_select(haystack: &str) -> bool {
    let mut search_from = 0;
    while let Some(pos) = haystack[search_from..].find("union") {
        let after = search_from + pos + "union".len();
        let rest = &haystack[after..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() && trimmed.starts_with("select") {
            return true;
        }
        search_from = search_from + pos + 1;
    }
    false
}

fn failed_key(identifier: &str) -> String {
    format!("failed:{identifier}")
}

/// Record one suspicious request against the identifier.
///
/// Returns the post-increment failure count; the caller blocks the
/// identifier once it reaches `max_failed_attempts`.
pub async fn record_failure(
    store: &dyn KvStore,
    identifier: &str,
    config: &SecurityConfig,
) -> Result<u64, StoreError> {
    let count = store.incr(&failed_key(identifier)).await?;
    store
        .expire(
            &failed_key(identifier),
            Duration::from_secs(config.block_duration_secs),
        )
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn detects_directory_traversal() {
        assert!(is_suspicious("/files/../../etc/passwd", b""));
    }

    #[test]
    fn detects_script_injection_case_insensitive() {
        assert!(is_suspicious("/search?q=<SCRIPT>alert(1)</SCRIPT>", b""));
        assert!(is_suspicious("/comment", b"<script src=evil.js>"));
    }

    #[test]
    fn detects_sql_injection_with_any_whitespace() {
        assert!(is_suspicious("/q?id=1 UNION SELECT password", b""));
        assert!(is_suspicious("/q", b"union\t\nselect * from users"));
        // "union" and "select" must be whitespace-separated
        assert!(!is_suspicious("/q?id=unionselect", b""));
        assert!(!is_suspicious("/reunion/selection", b""));
    }

    #[test]
    fn detects_command_injection() {
        assert!(is_suspicious("/run?cmd=exec(rm)", b""));
        assert!(is_suspicious("/run", b"EXEC('whoami')"));
    }

    #[test]
    fn clean_requests_pass() {
        assert!(!is_suspicious("/courses/intro-to-ml", b"{\"page\": 1}"));
    }

    #[test]
    fn binary_bodies_are_scanned_lossily() {
        let mut body = vec![0xff, 0xfe];
        body.extend_from_slice(b"<script>");
        assert!(is_suspicious("/upload", &body));
    }

    #[tokio::test]
    async fn failure_counter_escalates() {
        let store = MemoryStore::new();
        let config = SecurityConfig::default();
        for expected in 1..=3 {
            let count = record_failure(&store, "1.2.3.4", &config).await.unwrap();
            assert_eq!(count, expected);
        }
    }
}
