//! API key authentication and rate limiting
//!
//! The key is read from `X-API-Key`, then `Authorization: Bearer`, then the
//! `apiKey` query parameter. Authenticated responses carry the
//! `X-RateLimit-*` headers of the key's current window.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::stub::error::StubError;
use crate::stub::state::StubState;
use crate::stub::store::RateStatus;

/// Extract the presented API key, if any
///
/// A blank value in one place does not hide a key given in the next.
pub fn presented_key(request: &Request) -> Option<String> {
    let headers = request.headers();
    let non_blank = |k: &str| Some(k.trim().to_string()).filter(|k| !k.is_empty());

    let from_header = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .and_then(non_blank);

    let from_bearer = || {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(non_blank)
    };

    let from_query = || {
        Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(params)| params.get("apiKey").and_then(|k| non_blank(k)))
    };

    from_header.or_else(from_bearer).or_else(from_query)
}

/// Middleware guarding every `/api/v1` route
pub async fn require_api_key(
    State(state): State<Arc<StubState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(key) = presented_key(&request) else {
        return StubError::Unauthorized("API key is required".to_string()).into_response();
    };

    let now = chrono::Utc::now();
    let (auth, rate) = {
        let mut store = state.store.write().await;
        let auth = match store.authenticate(&key, now) {
            Ok(auth) => auth,
            Err(e) => return e.into_response(),
        };
        let rate = store.hit_rate_limit(&auth.key_id, state.config.rate_limit_per_minute, now);
        (auth, rate)
    };

    let mut response = if rate.allowed {
        request.extensions_mut().insert(auth);
        next.run(request).await
    } else {
        tracing::debug!(key_id = %auth.key_id, "Rate limit exceeded");
        StubError::RateLimited("Too many requests, please try again later".to_string())
            .into_response()
    };

    apply_rate_headers(response.headers_mut(), &rate);
    response
}

fn apply_rate_headers(headers: &mut HeaderMap, rate: &RateStatus) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(rate.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(rate.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(rate.reset));
}
