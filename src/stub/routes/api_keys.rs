//! API Key Routes
//!
//! Keys are managed by an already authenticated key of the same account.
//!
//! - POST /api/v1/api-keys - Issue a key
//! - GET /api/v1/api-keys - List keys
//! - GET /api/v1/api-keys/:id - Get a key
//! - PATCH /api/v1/api-keys/:id - Rename or change expiry
//! - DELETE /api/v1/api-keys/:id - Revoke a key

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::model::{ApiKey, ApiResponse, CreateApiKeyRequest, UpdateApiKeyRequest};
use crate::stub::error::{StubError, StubResult};
use crate::stub::state::StubState;
use crate::stub::store::AuthContext;
use crate::stub::validate::validate_key_name;

/// An expiry, when given, must lie after `now`
fn ensure_future_expiry(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> StubResult<()> {
    if expires_at.map(|at| at <= now).unwrap_or(false) {
        return Err(StubError::invalid(
            "expiresAt",
            "Expiry date must be in the future",
        ));
    }
    Ok(())
}

/// POST /api/v1/api-keys
pub async fn create_key(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateApiKeyRequest>, JsonRejection>,
) -> StubResult<(StatusCode, Json<ApiResponse<ApiKey>>)> {
    let Json(req) = payload?;
    let name = validate_key_name(Some(&req.name))?
        .ok_or_else(|| StubError::invalid("name", "Name is required"))?;

    let now = chrono::Utc::now();
    ensure_future_expiry(req.expires_at, now)?;

    let key = state
        .store
        .write()
        .await
        .create_key(&auth.account, name, req.expires_at, now);

    tracing::info!(key_id = %key.id, "Issued API key");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("API key created successfully", key)),
    ))
}

/// GET /api/v1/api-keys
pub async fn list_keys(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
) -> Json<ApiResponse<Vec<ApiKey>>> {
    let keys = state.store.read().await.list_keys(&auth.account);
    Json(ApiResponse::ok("API keys retrieved successfully", keys))
}

/// GET /api/v1/api-keys/:id
pub async fn get_key(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> StubResult<Json<ApiResponse<ApiKey>>> {
    let key = state.store.write().await.get_key(&auth.account, &id)?;
    Ok(Json(ApiResponse::ok("API key retrieved successfully", key)))
}

/// PATCH /api/v1/api-keys/:id
pub async fn update_key(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateApiKeyRequest>, JsonRejection>,
) -> StubResult<Json<ApiResponse<ApiKey>>> {
    let Json(req) = payload?;
    let name = validate_key_name(req.name.as_deref())?;
    ensure_future_expiry(req.expires_at, chrono::Utc::now())?;

    let key = state
        .store
        .write()
        .await
        .update_key(&auth.account, &id, name, req.expires_at)?;

    Ok(Json(ApiResponse::ok("API key updated successfully", key)))
}

/// DELETE /api/v1/api-keys/:id
pub async fn revoke_key(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> StubResult<Json<ApiResponse<serde_json::Value>>> {
    state.store.write().await.revoke_key(&auth.account, &id)?;

    tracing::info!(key_id = %id, "Revoked API key");

    Ok(Json(ApiResponse::ok(
        "API key revoked successfully",
        serde_json::json!({ "message": "API key revoked successfully" }),
    )))
}
