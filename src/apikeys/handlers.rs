//! API-key route handlers.
//!
//! `/api/validate` is the key-gated entry point: the presented key is both
//! the credential and the quota identifier. The `/api/keys` management
//! surface is session-authenticated and owner-scoped.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apikeys::quota;
use crate::apikeys::record::ApiKeyRecord;
use crate::auth::Principal;
use crate::error::GateError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::StoreError;

const DEFAULT_KEY_NAME: &str = "Default Key";

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

/// `POST /api/validate` — validate a key and charge its quota.
pub async fn validate_key(
    State(state): State<AppState>,
    Json(body): Json<ValidateRequest>,
) -> Result<Response, GateError> {
    let api_key = body
        .api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| GateError::Validation("API key is required".to_string()))?;

    let record = state
        .keys
        .find_active(&api_key)
        .await?
        .ok_or(GateError::InvalidApiKey)?;

    // Validation is request-scoped: an unavailable store is a 500 here, not
    // a fail-open pass.
    let store = state
        .kv
        .as_deref()
        .ok_or_else(|| StoreError::Internal("counter store not configured".to_string()))?;

    let decision = quota::check_sliding_window(store, &api_key, &state.config.api_quota).await?;
    if !decision.allowed {
        metrics::record_key_quota_exceeded();
        tracing::debug!(key_name = %record.name, "API key over quota");
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "Rate limit exceeded",
                "remaining": 0,
                "reset": decision.reset,
            })),
        )
            .into_response());
    }

    let now = Utc::now();
    state.keys.touch_last_used(&api_key, now).await?;

    Ok(Json(ValidateResponse {
        valid: true,
        name: record.name,
        created_at: record.created_at,
        last_used: now,
        remaining: decision.remaining,
        reset: decision.reset,
    })
    .into_response())
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/keys` — mint a key for the authenticated principal.
pub async fn create_key(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyRecord>), GateError> {
    let name = body
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_KEY_NAME.to_string());

    let record = ApiKeyRecord::new(name, principal.id);
    state.keys.insert(record.clone()).await?;

    tracing::info!(owner = %record.owner_id, key_name = %record.name, "API key created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/keys` — list the principal's keys, newest first.
pub async fn list_keys(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<ApiKeyRecord>>, GateError> {
    Ok(Json(state.keys.list_by_owner(&principal.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RenameKeyRequest {
    pub name: String,
}

/// `PATCH /api/keys/{id}` — rename an owned key.
pub async fn rename_key(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(body): Json<RenameKeyRequest>,
) -> Result<Json<ApiKeyRecord>, GateError> {
    if body.name.is_empty() {
        return Err(GateError::Validation("Name is required".to_string()));
    }

    state
        .keys
        .rename(&id, &principal.id, &body.name)
        .await?
        .map(Json)
        .ok_or(GateError::NotFound)
}

/// `DELETE /api/keys/{id}` — delete an owned key.
pub async fn delete_key(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, GateError> {
    if state.keys.delete(&id, &principal.id).await? {
        tracing::info!(owner = %principal.id, key_id = %id, "API key deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(GateError::NotFound)
    }
}
