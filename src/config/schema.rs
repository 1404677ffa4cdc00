//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gatekeeper. All types derive Serde traits for deserialization from config
//! files, and every section has defaults so a minimal config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the gatekeeper service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Per-IP security middleware settings (fixed window, blocks, abuse).
    pub security: SecurityConfig,

    /// API-key tier quota settings (sliding window).
    pub api_quota: ApiQuotaConfig,

    /// Session token verification settings.
    pub auth: AuthConfig,

    /// Role-based route classes.
    pub roles: RoleConfig,

    /// Counter / block store backend.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Security middleware configuration.
///
/// Window boundaries are not wall-clock aligned: each identifier's window
/// starts at its first request after the previous window or block expired.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Fixed rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,

    /// Maximum requests per identifier per window.
    pub max_requests: u64,

    /// Block duration in seconds once a quota or abuse threshold is breached.
    pub block_duration_secs: u64,

    /// Suspicious-request detections before an identifier is blocked.
    pub max_failed_attempts: u64,

    /// Maximum body size buffered for pattern inspection, in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_secs: 60,
            max_requests: 100,
            block_duration_secs: 60 * 60,
            max_failed_attempts: 5,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// API-key tier quota configuration (independent of the security tier).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiQuotaConfig {
    /// Sliding window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per key per window.
    pub max_requests: u64,
}

impl Default for ApiQuotaConfig {
    fn default() -> Self {
        Self {
            window_secs: 24 * 60 * 60,
            max_requests: 100, // free tier
        }
    }
}

/// Session token verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret used to verify session tokens.
    pub token_secret: String,

    /// Path unauthenticated navigation is redirected to.
    pub sign_in_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            token_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
            sign_in_path: "/auth/signin".to_string(),
        }
    }
}

/// Role-based route configuration.
///
/// Public entries match by prefix, except the bare "/" which matches only the
/// root path exactly (a "/" prefix would make every path public).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoleConfig {
    /// Paths that bypass all security checks.
    pub public: Vec<String>,

    /// Path prefixes a `user` principal may access.
    pub user: Vec<String>,

    /// Path prefixes an `instructor` principal may access.
    pub instructor: Vec<String>,

    /// Where a principal is redirected when it requests a path outside its
    /// allowed prefixes.
    pub dashboard_path: String,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            public: vec![
                "/".to_string(),
                "/about".to_string(),
                "/contact".to_string(),
                "/auth/signin".to_string(),
                "/auth/signup".to_string(),
                "/cookies".to_string(),
                "/health".to_string(),
            ],
            user: vec![
                "/dashboard".to_string(),
                "/courses".to_string(),
                "/my-courses".to_string(),
                "/profile".to_string(),
            ],
            instructor: vec![
                "/dashboard".to_string(),
                "/courses".to_string(),
                "/my-courses".to_string(),
                "/profile".to_string(),
                "/instructor".to_string(),
            ],
            dashboard_path: "/dashboard".to_string(),
        }
    }
}

/// Counter store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Single-node in-process store.
    Memory,
    /// Shared redis instance.
    Redis,
    /// No store: security checks are bypassed (fail-open).
    Disabled,
}

/// Counter / block store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backend holds counters and blocks.
    pub backend: StoreBackend,

    /// Redis connection URL (used when backend = "redis").
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
