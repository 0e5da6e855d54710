//! Stub Error Types
//!
//! Every failure is rendered as the service's error envelope with the
//! matching status code.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::{ErrorResponse, FieldError};

/// Stub server errors
#[derive(Error, Debug)]
pub enum StubError {
    /// Payload rejected, listing each failing field
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Missing, unknown, revoked or expired key; wrong scan password
    #[error("{0}")]
    Unauthorized(String),

    /// Plan limit, or a scan of an inactive code
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Short code already taken
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StubError {
    /// Validation failure of a single field
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        StubError::Validation {
            errors: vec![FieldError::new(path, message.clone())],
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StubError::Validation { .. } => StatusCode::BAD_REQUEST,
            StubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            StubError::Forbidden(_) => StatusCode::FORBIDDEN,
            StubError::NotFound(_) => StatusCode::NOT_FOUND,
            StubError::Conflict(_) => StatusCode::CONFLICT,
            StubError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            StubError::Internal(_) | StubError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error_message = %self, "Stub error");
        } else {
            tracing::debug!(status = status.as_u16(), error_message = %self, "Request rejected");
        }

        let body = match self {
            StubError::Validation { message, errors } => ErrorResponse::with_fields(message, errors),
            other => ErrorResponse::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for StubError {
    fn from(rejection: JsonRejection) -> Self {
        StubError::invalid("", rejection.body_text())
    }
}

impl From<QueryRejection> for StubError {
    fn from(rejection: QueryRejection) -> Self {
        StubError::invalid("", rejection.body_text())
    }
}

impl From<PathRejection> for StubError {
    fn from(rejection: PathRejection) -> Self {
        StubError::invalid("", rejection.body_text())
    }
}

/// Result type for stub handlers
pub type StubResult<T> = Result<T, StubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StubError::invalid("name", "Name is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StubError::Conflict("taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            StubError::RateLimited("slow down".into()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
