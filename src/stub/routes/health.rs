//! Health Route
//!
//! - GET /health - Liveness, uptime and version

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::stub::state::StubState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health
pub async fn health(State(state): State<Arc<StubState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
