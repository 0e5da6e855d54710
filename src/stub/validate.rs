//! Request validation
//!
//! Bodies are decoded loosely so that every problem can be reported with its
//! field path instead of failing on the first type mismatch.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{CustomDesign, FieldError, QrCodeType, QrData, UpdateQrRequest};
use crate::stub::error::StubError;
use crate::stub::store::NewQr;

/// Raw `POST /public/qr` body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub qr_type: Option<String>,
    #[serde(default)]
    pub destination_url: Option<String>,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub qr_data: Option<serde_json::Value>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub scan_limit: Option<i64>,
    #[serde(default)]
    pub custom_design: Option<serde_json::Value>,
}

/// Collects field errors and turns them into one 400
#[derive(Default)]
struct Problems(Vec<FieldError>);

impl Problems {
    fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(path, message));
    }

    fn finish<T>(self, value: T) -> Result<T, StubError> {
        match self.0.len() {
            0 => Ok(value),
            1 => Err(StubError::Validation {
                message: self.0[0].message.clone(),
                errors: self.0,
            }),
            _ => Err(StubError::Validation {
                message: "Validation error".to_string(),
                errors: self.0,
            }),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") || url.starts_with("https://")) && !url.contains(char::is_whitespace)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn validate_create(body: CreateQrBody, now: DateTime<Utc>) -> Result<NewQr, StubError> {
    let mut problems = Problems::default();

    let name = non_blank(body.name);
    if name.is_none() {
        problems.add("name", "Name is required");
    }

    let qr_type = match non_blank(body.qr_type) {
        None => {
            problems.add("type", "Type is required");
            None
        }
        Some(t) => match t.parse::<QrCodeType>() {
            Ok(t) => Some(t),
            Err(_) => {
                problems.add("type", format!("Invalid QR code type: {}", t));
                None
            }
        },
    };

    let mut destination_url = None;
    let mut qr_data = None;
    if let Some(qr_type) = qr_type {
        if qr_type.is_url_like() {
            match non_blank(body.destination_url) {
                None => problems.add(
                    "destinationUrl",
                    format!("Destination URL is required for {} codes", qr_type),
                ),
                Some(url) if !is_http_url(&url) => {
                    problems.add("destinationUrl", "Destination URL must be a valid URL")
                }
                Some(url) => destination_url = Some(url),
            }
        } else {
            match body.qr_data {
                None | Some(serde_json::Value::Null) => {
                    problems.add("qrData", format!("qrData is required for {} codes", qr_type))
                }
                Some(raw) => match QrData::from_value(qr_type, raw.clone()) {
                    Ok(data) => {
                        let blank = data.blank_required_fields();
                        if blank.is_empty() {
                            qr_data = Some(raw);
                        }
                        for field in blank {
                            problems.add(format!("qrData.{}", field), format!("{} is required", field));
                        }
                    }
                    Err(e) => problems.add("qrData", format!("Invalid qrData: {}", e)),
                },
            }
        }
    }

    let short_code = non_blank(body.short_code);
    if let Some(code) = &short_code {
        let re = regex::Regex::new(r"^[A-Za-z0-9_-]{3,50}$")
            .map_err(|e| StubError::Internal(e.to_string()))?;
        if !re.is_match(code) {
            problems.add(
                "shortCode",
                "Short code must be 3-50 letters, digits, hyphens or underscores",
            );
        }
    }

    // The password is compared verbatim, so it is not trimmed
    let password = body.password.filter(|p| !p.is_empty());
    if let Some(p) = &password {
        let len = p.chars().count();
        if !(4..=50).contains(&len) {
            problems.add("password", "Password must be 4-50 characters");
        }
    }

    let expires_at = match non_blank(body.expires_at) {
        None => None,
        Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) if at.with_timezone(&Utc) <= now => {
                problems.add("expiresAt", "Expiry date must be in the future");
                None
            }
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(_) => {
                problems.add("expiresAt", "Expiry date must be an ISO-8601 timestamp");
                None
            }
        },
    };

    let scan_limit = match body.scan_limit {
        None => None,
        Some(n) if n >= 1 && n <= u32::MAX as i64 => Some(n as u32),
        Some(_) => {
            problems.add("scanLimit", "Scan limit must be a positive integer");
            None
        }
    };

    let custom_design = match body.custom_design {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => match serde_json::from_value::<CustomDesign>(raw) {
            Ok(design) => {
                if let Some(w) = design.width {
                    if !(100..=2000).contains(&w) {
                        problems.add("customDesign.width", "Width must be between 100 and 2000");
                    }
                }
                if let Some(size) = design.image_size {
                    if !(0.1..=0.5).contains(&size) {
                        problems.add(
                            "customDesign.imageSize",
                            "Image size must be between 0.1 and 0.5",
                        );
                    }
                }
                Some(design)
            }
            Err(e) => {
                problems.add("customDesign", format!("Invalid customDesign: {}", e));
                None
            }
        },
    };

    let (Some(name), Some(qr_type)) = (name, qr_type) else {
        return Err(problems
            .finish(())
            .err()
            .unwrap_or_else(|| StubError::invalid("", "Validation error")));
    };

    problems.finish(NewQr {
        name,
        qr_type,
        destination_url,
        short_code,
        qr_data,
        password,
        expires_at,
        scan_limit,
        custom_design,
    })
}

pub fn validate_update(update: UpdateQrRequest) -> Result<UpdateQrRequest, StubError> {
    if update.is_empty() {
        return Err(StubError::invalid(
            "",
            "At least one of name, destinationUrl or isActive is required",
        ));
    }

    let mut problems = Problems::default();
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            problems.add("name", "Name cannot be empty");
        }
    }
    if let Some(url) = &update.destination_url {
        if !is_http_url(url) {
            problems.add("destinationUrl", "Destination URL must be a valid URL");
        }
    }

    problems.finish(UpdateQrRequest {
        name: update.name.map(|n| n.trim().to_string()),
        destination_url: update.destination_url.map(|u| u.trim().to_string()),
        is_active: update.is_active,
    })
}

/// Name of a new or renamed API key
pub fn validate_key_name(name: Option<&str>) -> Result<Option<String>, StubError> {
    match name.map(str::trim) {
        None => Ok(None),
        Some("") => Err(StubError::invalid("name", "Name is required")),
        Some(n) if n.chars().count() > 100 => {
            Err(StubError::invalid("name", "Name must be at most 100 characters"))
        }
        Some(n) => Ok(Some(n.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> CreateQrBody {
        serde_json::from_value(value).unwrap()
    }

    fn field_paths(err: StubError) -> Vec<String> {
        match err {
            StubError::Validation { errors, .. } => errors.into_iter().map(|e| e.path).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_url_code() {
        let new = validate_create(
            body(json!({
                "name": "Test QR",
                "type": "URL",
                "destinationUrl": "https://example.com",
                "shortCode": "test-1"
            })),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(new.qr_type, QrCodeType::Url);
        assert_eq!(new.short_code.as_deref(), Some("test-1"));
        assert!(new.qr_data.is_none());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let err = validate_create(body(json!({ "type": "URL" })), Utc::now()).unwrap_err();
        assert_eq!(field_paths(err), vec!["name", "destinationUrl"]);
    }

    #[test]
    fn test_single_problem_becomes_message() {
        let err = validate_create(
            body(json!({
                "name": "Locked",
                "type": "URL",
                "destinationUrl": "https://example.com",
                "password": "abc"
            })),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Password must be 4-50 characters");
    }

    #[test]
    fn test_structured_requires_sub_fields() {
        let err = validate_create(
            body(json!({
                "name": "Card",
                "type": "CONTACT",
                "qrData": { "firstName": "", "lastName": "Doe" }
            })),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(field_paths(err), vec!["qrData.firstName"]);

        let err = validate_create(
            body(json!({ "name": "Net", "type": "WIFI", "qrData": { "password": "x" } })),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(field_paths(err), vec!["qrData"]);
    }

    #[test]
    fn test_advanced_field_ranges() {
        let err = validate_create(
            body(json!({
                "name": "Styled",
                "type": "URL",
                "destinationUrl": "https://example.com",
                "shortCode": "a b",
                "scanLimit": 0,
                "expiresAt": "2001-01-01T00:00:00Z",
                "customDesign": { "width": 50, "imageSize": 0.9 }
            })),
            Utc::now(),
        )
        .unwrap_err();

        assert_eq!(
            field_paths(err),
            vec![
                "shortCode",
                "expiresAt",
                "scanLimit",
                "customDesign.width",
                "customDesign.imageSize"
            ]
        );
    }

    #[test]
    fn test_update_rules() {
        assert!(validate_update(UpdateQrRequest::default()).is_err());

        let err = validate_update(UpdateQrRequest {
            destination_url: Some("not a url".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(field_paths(err), vec!["destinationUrl"]);

        let ok = validate_update(UpdateQrRequest {
            name: Some("  Renamed ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.name.as_deref(), Some("Renamed"));
    }
}
