//! Client error types
//!
//! Failures reported by the service keep the status, the envelope's
//! `message` and `errorMessages`, and any rate-limit headers. Transport
//! failures (no response at all) are separate variants so callers can fall
//! back to a generic message.

use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::model::{ErrorResponse, FieldError};

/// Errors returned by [`crate::client::QrApiClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service answered with a non-success status
    #[error("{0}")]
    Server(ServerError),

    #[error("Request timeout")]
    Timeout,

    #[error("Cannot reach QR service at {url}")]
    Unavailable { url: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("API key is not configured")]
    MissingApiKey,
}

impl ClientError {
    /// HTTP status, when the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server(e) => Some(e.status),
            _ => None,
        }
    }

    /// Category of a service-reported failure
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Server(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// The `message` field of the error envelope, if the service sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server(e) => e.message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    /// Message to show the user: the service's own message, or `fallback`
    pub fn display_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Per-field validation errors, empty unless the service listed some
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Server(e) => &e.errors,
            _ => &[],
        }
    }
}

/// Category of a failure reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401: bad or missing API key
    Authentication,
    /// 400: payload rejected
    Validation,
    /// 403: plan limit reached
    PlanLimit,
    /// 404
    NotFound,
    /// 409: duplicate short code
    Conflict,
    /// 429
    RateLimit,
    /// Any other status
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::PlanLimit,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimit,
            _ => ErrorKind::Other,
        }
    }
}

/// A non-success response from the service
#[derive(Debug, Clone)]
pub struct ServerError {
    pub status: u16,
    /// Envelope `message`, absent when the body was not an error envelope
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
    pub rate_limit: Option<RateLimit>,
    /// Raw response body, as JSON when it parsed
    pub details: serde_json::Value,
}

impl ServerError {
    /// Build from status, headers and the raw body text
    pub fn from_response(status: u16, headers: &HeaderMap, body: &str) -> Self {
        let details = serde_json::from_str::<serde_json::Value>(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));

        let envelope = serde_json::from_value::<ErrorResponse>(details.clone()).ok();
        let (message, errors) = match envelope {
            Some(env) => (Some(env.message), env.error_messages),
            None => (None, Vec::new()),
        };

        Self {
            status,
            message,
            errors,
            rate_limit: RateLimit::from_headers(headers),
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message.as_deref().filter(|m| !m.is_empty()) {
            Some(message) => f.write_str(message),
            None => {
                let reason = reqwest::StatusCode::from_u16(self.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown status");
                write!(f, "HTTP {} {}", self.status, reason)
            }
        }
    }
}

/// `X-RateLimit-*` response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix seconds when the window resets
    pub reset: Option<i64>,
}

impl RateLimit {
    /// Parse the headers; `None` when none of them is present
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        }

        let rate_limit = Self {
            limit: parse(headers, "x-ratelimit-limit"),
            remaining: parse(headers, "x-ratelimit-remaining"),
            reset: parse(headers, "x-ratelimit-reset"),
        };

        if rate_limit.limit.is_none() && rate_limit.remaining.is_none() && rate_limit.reset.is_none()
        {
            None
        } else {
            Some(rate_limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_invalid_key_message_is_shown_verbatim() {
        let body = r#"{"success":false,"message":"Invalid API key","errorMessages":[{"path":"","message":"Invalid API key"}]}"#;
        let err = ClientError::Server(ServerError::from_response(401, &HeaderMap::new(), body));

        assert_eq!(err.to_string(), "Invalid API key");
        assert_eq!(err.display_message("Failed to fetch QR codes"), "Invalid API key");
        assert_eq!(err.kind(), Some(ErrorKind::Authentication));
    }

    #[test]
    fn test_fallback_without_envelope() {
        let err = ClientError::Server(ServerError::from_response(
            502,
            &HeaderMap::new(),
            "<html>Bad Gateway</html>",
        ));
        assert_eq!(err.display_message("Failed to create QR code"), "Failed to create QR code");
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway");

        let unreachable = ClientError::Unavailable {
            url: "http://localhost:1".to_string(),
        };
        assert_eq!(
            unreachable.display_message("Failed to create QR code"),
            "Failed to create QR code"
        );
    }

    #[test]
    fn test_validation_field_errors() {
        let body = r#"{"success":false,"message":"Validation error","errorMessages":[{"path":"password","message":"Password must be 4-50 characters"}]}"#;
        let err = ClientError::Server(ServerError::from_response(400, &HeaderMap::new(), body));

        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].path, "password");
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Limit", HeaderValue::from_static("100"));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        headers.insert("X-RateLimit-Reset", HeaderValue::from_static("1705492800"));

        let rl = RateLimit::from_headers(&headers).unwrap();
        assert_eq!(rl.limit, Some(100));
        assert_eq!(rl.remaining, Some(0));
        assert_eq!(rl.reset, Some(1705492800));

        assert!(RateLimit::from_headers(&HeaderMap::new()).is_none());
    }
}
