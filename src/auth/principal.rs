//! The authenticated actor attached to a request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::auth::token;
use crate::error::GateError;
use crate::http::server::AppState;

/// Platform roles, least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Instructor,
    Admin,
}

/// The authenticated actor: id plus role, resolved from a signed token.
/// Read-only input to the role router.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Page routes get the principal attached by the role router; API
        // routes resolve it here.
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let token = bearer_token(parts).ok_or(GateError::Unauthenticated)?;
        token::verify_token(token, &state.config.auth.token_secret)
            .ok_or(GateError::Unauthenticated)
    }
}
