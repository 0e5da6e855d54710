//! QR Routes
//!
//! - POST /api/v1/public/qr - Create a QR code
//! - GET /api/v1/public/qr - List QR codes (newest first, paginated)
//! - GET /api/v1/public/qr/:id - Get a QR code
//! - PATCH /api/v1/public/qr/:id - Update name, destination or active flag
//! - DELETE /api/v1/public/qr/:id - Delete a QR code
//! - GET /api/v1/public/qr/:id/analytics - Scan analytics

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::model::{ApiResponse, PageMeta, QrAnalytics, QrCode, UpdateQrRequest};
use crate::stub::error::StubResult;
use crate::stub::state::StubState;
use crate::stub::store::AuthContext;
use crate::stub::validate::{validate_create, validate_update, CreateQrBody};

/// Largest page a single list request may ask for
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, alias = "search")]
    pub search_term: Option<String>,
}

/// POST /api/v1/public/qr
pub async fn create_qr(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateQrBody>, JsonRejection>,
) -> StubResult<(StatusCode, Json<ApiResponse<QrCode>>)> {
    let Json(body) = payload?;
    let now = chrono::Utc::now();
    let new = validate_create(body, now)?;

    let qr = state.store.write().await.create_qr(&auth.account, new, now)?;

    tracing::info!(qr_id = %qr.id, short_code = %qr.short_code, "Created QR code");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("QR code created successfully", qr)),
    ))
}

/// GET /api/v1/public/qr?page=&limit=&searchTerm=
pub async fn list_qr(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> StubResult<Json<ApiResponse<Vec<QrCode>>>> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);

    let (items, total) = state.store.write().await.list_qr(
        &auth.account,
        page,
        limit,
        query.search_term.as_deref(),
        chrono::Utc::now(),
    );

    Ok(Json(ApiResponse::paged(
        "QR codes retrieved successfully",
        items,
        PageMeta { page, limit, total },
    )))
}

/// GET /api/v1/public/qr/:id
pub async fn get_qr(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> StubResult<Json<ApiResponse<QrCode>>> {
    let qr = state
        .store
        .write()
        .await
        .get_qr(&auth.account, &id, chrono::Utc::now())?;

    Ok(Json(ApiResponse::ok("QR code retrieved successfully", qr)))
}

/// PATCH /api/v1/public/qr/:id
pub async fn update_qr(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateQrRequest>, JsonRejection>,
) -> StubResult<Json<ApiResponse<QrCode>>> {
    let Json(update) = payload?;
    let update = validate_update(update)?;

    let qr = state
        .store
        .write()
        .await
        .update_qr(&auth.account, &id, update, chrono::Utc::now())?;

    tracing::info!(qr_id = %qr.id, "Updated QR code");

    Ok(Json(ApiResponse::ok("QR code updated successfully", qr)))
}

/// DELETE /api/v1/public/qr/:id
pub async fn delete_qr(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> StubResult<Json<ApiResponse<serde_json::Value>>> {
    state.store.write().await.delete_qr(&auth.account, &id)?;

    tracing::info!(qr_id = %id, "Deleted QR code");

    Ok(Json(ApiResponse::ok(
        "QR code deleted successfully",
        serde_json::json!({ "message": "QR code deleted successfully" }),
    )))
}

/// GET /api/v1/public/qr/:id/analytics
pub async fn qr_analytics(
    State(state): State<Arc<StubState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> StubResult<Json<ApiResponse<QrAnalytics>>> {
    let analytics = state
        .store
        .write()
        .await
        .analytics(&auth.account, &id, chrono::Utc::now())?;

    Ok(Json(ApiResponse::ok(
        "QR code analytics retrieved successfully",
        analytics,
    )))
}
