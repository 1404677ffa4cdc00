//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows and thresholds > 0)
//! - Check that role dashboards are reachable (no redirect loops)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::{GateConfig, StoreBackend};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("store.redis_url must be set when store.backend is \"redis\"")]
    MissingRedisUrl,

    #[error("roles.dashboard_path {path:?} is not an allowed prefix for role {role:?}")]
    UnreachableDashboard { path: String, role: &'static str },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("security.rate_limit_window_secs", config.security.rate_limit_window_secs),
        ("security.max_requests", config.security.max_requests),
        ("security.block_duration_secs", config.security.block_duration_secs),
        ("security.max_failed_attempts", config.security.max_failed_attempts),
        ("api_quota.window_secs", config.api_quota.window_secs),
        ("api_quota.max_requests", config.api_quota.max_requests),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    if config.listener.bind_address.is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    if config.store.backend == StoreBackend::Redis && config.store.redis_url.is_empty() {
        errors.push(ValidationError::MissingRedisUrl);
    }

    // The redirect target must itself be allowed, or wrong-role navigation
    // loops forever.
    for (role, prefixes) in [("user", &config.roles.user), ("instructor", &config.roles.instructor)] {
        if !prefixes
            .iter()
            .any(|p| config.roles.dashboard_path.starts_with(p.as_str()))
        {
            errors.push(ValidationError::UnreachableDashboard {
                path: config.roles.dashboard_path.clone(),
                role,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = GateConfig::default();
        config.security.rate_limit_window_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroValue {
            field: "security.rate_limit_window_secs"
        }));
    }

    #[test]
    fn redis_backend_requires_url() {
        let mut config = GateConfig::default();
        config.store.backend = StoreBackend::Redis;
        config.store.redis_url = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingRedisUrl));
    }

    #[test]
    fn dashboard_must_be_reachable() {
        let mut config = GateConfig::default();
        config.roles.user = vec!["/courses".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::UnreachableDashboard { role: "user", .. }
        ));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = GateConfig::default();
        config.security.max_requests = 0;
        config.listener.bind_address = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
