//! Role-based route classes and the role router middleware.
//!
//! # Responsibilities
//! - Classify paths as public / role-gated
//! - Redirect unauthenticated navigation to the sign-in page
//! - Confine non-admin principals to their configured prefixes
//! - Record unauthorized attempts (advisory, never blocking)
//!
//! # Design Decisions
//! - Prefix match, first matching entry wins
//! - The bare "/" public entry matches only the root path exactly
//! - Admin is allowed unconditionally on any path

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::principal::Role;
use crate::auth::token;
use crate::config::RoleConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::client_ip;
use crate::security::events::{self, SecurityEvent};

/// API routes authenticate per-call (API key or bearer extractor) rather than
/// through the role router.
const API_PREFIX: &str = "/api";

/// Immutable route-class table, built once from config.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<String>,
    user: Vec<String>,
    instructor: Vec<String>,
    dashboard_path: String,
}

impl RouteTable {
    pub fn from_config(config: &RoleConfig) -> Self {
        Self {
            public: config.public.clone(),
            user: config.user.clone(),
            instructor: config.instructor.clone(),
            dashboard_path: config.dashboard_path.clone(),
        }
    }

    /// True iff the path belongs to a public route class.
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|prefix| {
            if prefix == "/" {
                path == "/"
            } else {
                path.starts_with(prefix.as_str())
            }
        })
    }

    /// True iff the role may access the path. First matching prefix wins.
    pub fn is_allowed(&self, role: Role, path: &str) -> bool {
        let prefixes = match role {
            Role::Admin => return true,
            Role::User => &self.user,
            Role::Instructor => &self.instructor,
        };
        prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }
}

/// Middleware enforcing authentication and role confinement on page routes.
pub async fn role_router_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Public routes and the API tier bypass the role router entirely.
    if path.starts_with(API_PREFIX) || state.routes.is_public(&path) {
        return next.run(request).await;
    }

    let principal = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|t| token::verify_token(t, &state.config.auth.token_secret));

    let Some(principal) = principal else {
        tracing::debug!(path = %path, "Unauthenticated navigation - redirecting to sign-in");
        return Redirect::to(&state.config.auth.sign_in_path).into_response();
    };

    if !state.routes.is_allowed(principal.role, &path) {
        let ip = client_ip(request.headers());
        tracing::warn!(
            client = %ip,
            user = %principal.id,
            role = ?principal.role,
            path = %path,
            "Unauthorized route access - redirecting to dashboard"
        );
        metrics::record_unauthorized();
        // Advisory counter; a failure here must not affect the redirect
        if let Some(store) = &state.kv {
            if let Err(e) = store.incr(&format!("unauthorized:{ip}")).await {
                tracing::warn!(error = %e, "Failed to record unauthorized attempt");
            }
        }
        return Redirect::to(state.routes.dashboard_path()).into_response();
    }

    if let Some(store) = &state.kv {
        let event = SecurityEvent::request(
            client_ip(request.headers()),
            Some(principal.id.clone()),
            path,
            request.method().to_string(),
        );
        events::record(store.as_ref(), &event).await;
    }

    request.extensions_mut().insert(principal);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_config(&RoleConfig::default())
    }

    #[test]
    fn root_is_public_but_only_exactly() {
        let table = table();
        assert!(table.is_public("/"));
        assert!(!table.is_public("/dashboard"));
    }

    #[test]
    fn public_prefixes_match_subpaths() {
        let table = table();
        assert!(table.is_public("/about"));
        assert!(table.is_public("/auth/signin?next=/dashboard"));
        assert!(table.is_public("/cookies/policy"));
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let table = table();
        for path in ["/", "/dashboard", "/admin/settings", "/instructor/courses"] {
            assert!(table.is_allowed(Role::Admin, path), "admin denied on {path}");
        }
    }

    #[test]
    fn user_is_confined_to_its_prefixes() {
        let table = table();
        assert!(table.is_allowed(Role::User, "/dashboard"));
        assert!(table.is_allowed(Role::User, "/my-courses/42"));
        assert!(!table.is_allowed(Role::User, "/admin/settings"));
        assert!(!table.is_allowed(Role::User, "/instructor/courses"));
    }

    #[test]
    fn instructor_has_its_extra_prefix() {
        let table = table();
        assert!(table.is_allowed(Role::Instructor, "/instructor/courses"));
        assert!(!table.is_allowed(Role::User, "/instructor/courses"));
    }
}
