//! Scan Route
//!
//! - GET /q/:short_code - Resolve a public scan
//!
//! URL-like codes redirect with 302; structured codes answer with their
//! `qrData`. Password-protected codes expect `?password=`.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::model::ApiResponse;
use crate::stub::error::StubResult;
use crate::stub::state::StubState;
use crate::stub::store::ScanEvent;

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub password: Option<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First hop of `X-Forwarded-For`, then `X-Real-IP`
pub fn client_address(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .unwrap_or("unknown")
        .to_string()
}

/// Device class from the `User-Agent`
pub fn device_class(user_agent: Option<&str>) -> &'static str {
    let Some(ua) = user_agent else {
        return "unknown";
    };
    let ua = ua.to_lowercase();
    if ua.contains("ipad") || ua.contains("tablet") {
        "tablet"
    } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("android") {
        "mobile"
    } else {
        "desktop"
    }
}

/// GET /q/:short_code
pub async fn resolve_scan(
    State(state): State<Arc<StubState>>,
    Path(short_code): Path<String>,
    query: Result<Query<ScanQuery>, QueryRejection>,
    headers: HeaderMap,
) -> StubResult<Response> {
    let Query(query) = query?;

    let scan = ScanEvent {
        at: chrono::Utc::now(),
        client: client_address(&headers),
        location: header_str(&headers, "cf-ipcountry")
            .unwrap_or("Unknown")
            .to_string(),
        device: device_class(header_str(&headers, "user-agent")).to_string(),
    };

    let qr = state
        .store
        .write()
        .await
        .resolve_scan(&short_code, query.password.as_deref(), scan)?;

    tracing::debug!(short_code = %short_code, scan_count = qr.scan_count, "Resolved scan");

    match (qr.qr_type.is_url_like(), qr.destination_url) {
        (true, Some(url)) => Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response()),
        _ => Ok(Json(ApiResponse::ok(
            "QR code resolved successfully",
            serde_json::json!({
                "type": qr.qr_type,
                "qrData": qr.qr_data,
            }),
        ))
        .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_address(&headers), "unknown");

        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_address(&headers), "10.0.0.2");

        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_address(&headers), "203.0.113.7");
    }

    #[test]
    fn test_device_class() {
        assert_eq!(
            device_class(Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)")),
            "mobile"
        );
        assert_eq!(device_class(Some("Mozilla/5.0 (iPad; CPU OS 17_0)")), "tablet");
        assert_eq!(
            device_class(Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0")),
            "desktop"
        );
        assert_eq!(device_class(None), "unknown");
    }
}
