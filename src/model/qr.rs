//! QR code resource types
//!
//! - `QrCodeType`: the 19 content types the service understands
//! - `QrCode`: a QR code as returned by the service
//! - `CustomDesign`: server-side image styling parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Content type of a QR code
///
/// Determines whether the code carries a `destinationUrl` or a structured
/// `qrData` payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrCodeType {
    Url,
    Wifi,
    Email,
    Phone,
    Sms,
    Whatsapp,
    Location,
    Contact,
    Event,
    Mecard,
    Pdf,
    Video,
    Audio,
    SocialMedia,
    GoogleReview,
    Coupon,
    Feedback,
    BusinessPage,
    Text,
}

impl QrCodeType {
    /// Get all types in documentation order
    pub fn all() -> &'static [QrCodeType] {
        &[
            QrCodeType::Url,
            QrCodeType::Wifi,
            QrCodeType::Email,
            QrCodeType::Phone,
            QrCodeType::Sms,
            QrCodeType::Whatsapp,
            QrCodeType::Location,
            QrCodeType::Contact,
            QrCodeType::Event,
            QrCodeType::Mecard,
            QrCodeType::Pdf,
            QrCodeType::Video,
            QrCodeType::Audio,
            QrCodeType::SocialMedia,
            QrCodeType::GoogleReview,
            QrCodeType::Coupon,
            QrCodeType::Feedback,
            QrCodeType::BusinessPage,
            QrCodeType::Text,
        ]
    }

    /// Wire name, e.g. `SOCIAL_MEDIA`
    pub fn as_str(&self) -> &'static str {
        match self {
            QrCodeType::Url => "URL",
            QrCodeType::Wifi => "WIFI",
            QrCodeType::Email => "EMAIL",
            QrCodeType::Phone => "PHONE",
            QrCodeType::Sms => "SMS",
            QrCodeType::Whatsapp => "WHATSAPP",
            QrCodeType::Location => "LOCATION",
            QrCodeType::Contact => "CONTACT",
            QrCodeType::Event => "EVENT",
            QrCodeType::Mecard => "MECARD",
            QrCodeType::Pdf => "PDF",
            QrCodeType::Video => "VIDEO",
            QrCodeType::Audio => "AUDIO",
            QrCodeType::SocialMedia => "SOCIAL_MEDIA",
            QrCodeType::GoogleReview => "GOOGLE_REVIEW",
            QrCodeType::Coupon => "COUPON",
            QrCodeType::Feedback => "FEEDBACK",
            QrCodeType::BusinessPage => "BUSINESS_PAGE",
            QrCodeType::Text => "TEXT",
        }
    }

    /// True for types whose content is a `destinationUrl` rather than `qrData`
    pub fn is_url_like(&self) -> bool {
        matches!(
            self,
            QrCodeType::Url
                | QrCodeType::Pdf
                | QrCodeType::Video
                | QrCodeType::Audio
                | QrCodeType::SocialMedia
                | QrCodeType::GoogleReview
                | QrCodeType::Coupon
                | QrCodeType::Feedback
                | QrCodeType::BusinessPage
                | QrCodeType::Text
        )
    }
}

impl std::fmt::Display for QrCodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrCodeType {
    type Err = String;

    /// Accepts wire names case-insensitively, with `-` or `_` separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        QrCodeType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid QR code type: {}. Use one of: {}",
                    s,
                    QrCodeType::all()
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// A QR code as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: String,
    pub name: String,
    pub short_code: String,
    pub short_url: String,
    pub qr_code_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
    #[serde(rename = "type")]
    pub qr_type: QrCodeType,
    /// Type-dependent payload, see [`crate::model::QrData::from_value`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_design: Option<CustomDesign>,
    #[serde(default)]
    pub scan_count: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl QrCode {
    /// Scans left before the limit is hit, if a limit is set
    pub fn remaining_scans(&self) -> Option<u64> {
        self.scan_limit
            .map(|limit| (limit as u64).saturating_sub(self.scan_count))
    }
}

/// Error correction level of the rendered QR image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

impl FromStr for ErrorCorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L" => Ok(ErrorCorrectionLevel::L),
            "M" => Ok(ErrorCorrectionLevel::M),
            "Q" => Ok(ErrorCorrectionLevel::Q),
            "H" => Ok(ErrorCorrectionLevel::H),
            _ => Err(format!("Invalid error correction level: {}. Use L, M, Q, or H", s)),
        }
    }
}

/// Image styling applied by the service when rendering the QR code
///
/// Every field is optional; absent fields use the service defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomDesign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    /// Image width in pixels (100-2000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_correction_level: Option<ErrorCorrectionLevel>,
    /// Module shape: rounded, dots, classy, square
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dots_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dots_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners_square_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners_square_color: Option<String>,
    /// Logo embedded in the center of the code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_margin: Option<u32>,
    /// Logo size relative to the code (0.1-0.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<f32>,
}

impl CustomDesign {
    /// The design the dashboard starts from when advanced options are enabled
    pub fn dashboard_default() -> Self {
        Self {
            background_color: Some("#FFFFFF".to_string()),
            foreground_color: Some("#000000".to_string()),
            margin: Some(4),
            width: Some(500),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_names() {
        assert_eq!(QrCodeType::all().len(), 19);
        assert_eq!(
            serde_json::to_value(QrCodeType::SocialMedia).unwrap(),
            serde_json::json!("SOCIAL_MEDIA")
        );
        for t in QrCodeType::all() {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json.as_str(), Some(t.as_str()));
        }
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!("wifi".parse::<QrCodeType>(), Ok(QrCodeType::Wifi));
        assert_eq!(
            "google-review".parse::<QrCodeType>(),
            Ok(QrCodeType::GoogleReview)
        );
        assert!("barcode".parse::<QrCodeType>().is_err());
    }

    #[test]
    fn test_url_like_types() {
        let url_like = QrCodeType::all().iter().filter(|t| t.is_url_like()).count();
        assert_eq!(url_like, 10);
        assert!(!QrCodeType::Wifi.is_url_like());
        assert!(QrCodeType::Text.is_url_like());
    }

    #[test]
    fn test_decode_service_response() {
        let json = r#"{
            "id": "cm5abc123xyz",
            "name": "Product Launch Campaign",
            "shortCode": "launch24",
            "shortUrl": "https://your-domain.com/q/launch24",
            "qrCodeUrl": "https://res.cloudinary.com/demo/launch24.png",
            "destinationUrl": "https://example.com/product/launch",
            "type": "URL",
            "scanCount": 42,
            "isActive": true,
            "createdAt": "2026-01-17T10:30:00.000Z"
        }"#;

        let qr: QrCode = serde_json::from_str(json).unwrap();
        assert_eq!(qr.short_code, "launch24");
        assert_eq!(qr.qr_type, QrCodeType::Url);
        assert_eq!(qr.scan_count, 42);
        assert!(qr.qr_data.is_none());
        assert!(qr.remaining_scans().is_none());
    }

    #[test]
    fn test_custom_design_omits_unset_fields() {
        let json = serde_json::to_value(CustomDesign::dashboard_default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["backgroundColor"], "#FFFFFF");
        assert_eq!(obj["width"], 500);
    }
}
