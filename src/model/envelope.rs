//! Response envelopes
//!
//! Every response from the service is wrapped:
//!
//! - success: `{ success: true, message, data, meta? }`
//! - error: `{ success: false, message, errorMessages: [{ path, message }] }`

use serde::{Deserialize, Serialize};

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: None,
        }
    }

    pub fn paged(message: impl Into<String>, data: T, meta: PageMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            meta: Some(meta),
        }
    }
}

/// Pagination metadata of list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl PageMeta {
    /// Number of pages needed for `total` items (at least 1)
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(self.limit as u64);
        pages.max(1) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error_messages: Vec<FieldError>,
}

impl ErrorResponse {
    /// Error with a single entry under the empty path
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            error_messages: vec![FieldError {
                path: String::new(),
                message: message.clone(),
            }],
            message,
        }
    }

    /// Validation error listing each failing field
    pub fn with_fields(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_messages: errors,
        }
    }
}

/// A single error entry, `path` names the offending field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    #[serde(default)]
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let meta = PageMeta { page: 1, limit: 5, total: 11 };
        assert_eq!(meta.total_pages(), 3);
        assert!(meta.has_next());
        assert!(!meta.has_prev());

        let empty = PageMeta { page: 1, limit: 10, total: 0 };
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ErrorResponse::new(
            "QR code limit reached (10). Please upgrade your plan.",
        ))
        .unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["errorMessages"][0]["path"], "");
        assert_eq!(
            json["errorMessages"][0]["message"],
            "QR code limit reached (10). Please upgrade your plan."
        );
    }

    #[test]
    fn test_decode_list_envelope() {
        let json = r#"{
            "success": true,
            "message": "QR codes retrieved successfully",
            "data": [],
            "meta": { "page": 2, "limit": 5, "total": 7 }
        }"#;
        let resp: ApiResponse<Vec<serde_json::Value>> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.meta, Some(PageMeta { page: 2, limit: 5, total: 7 }));
        assert!(resp.data.is_empty());
    }
}
