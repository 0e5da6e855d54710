//! Request payloads
//!
//! Typed `qrData` shapes for the structured QR types, and the bodies and
//! query strings sent to the QR endpoints. Optional fields are skipped when
//! unset so they never reach the wire as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::qr::{CustomDesign, QrCodeType};

/// WiFi network security
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl std::str::FromStr for WifiEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa/wpa2" => Ok(WifiEncryption::Wpa),
            "wep" => Ok(WifiEncryption::Wep),
            "nopass" | "none" | "open" => Ok(WifiEncryption::NoPass),
            _ => Err(format!("Invalid encryption: {}. Use WPA, WEP, or nopass", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WifiData {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub encryption: WifiEncryption,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhoneData {
    pub phone: String,
}

/// SMS and WhatsApp payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PostalAddress {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
    }
}

/// vCard contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactData {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
}

/// Calendar event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

/// Simplified MECARD contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MecardData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Structured payload for the non URL-like QR types
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum QrData {
    Wifi(WifiData),
    Email(EmailData),
    Phone(PhoneData),
    Message(MessageData),
    Location(LocationData),
    Contact(ContactData),
    Event(EventData),
    Mecard(MecardData),
}

impl QrData {
    /// Decode a raw `qrData` object according to the QR type it belongs to
    pub fn from_value(
        qr_type: QrCodeType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let data = match qr_type {
            QrCodeType::Wifi => QrData::Wifi(serde_json::from_value(value)?),
            QrCodeType::Email => QrData::Email(serde_json::from_value(value)?),
            QrCodeType::Phone => QrData::Phone(serde_json::from_value(value)?),
            QrCodeType::Sms | QrCodeType::Whatsapp => {
                QrData::Message(serde_json::from_value(value)?)
            }
            QrCodeType::Location => QrData::Location(serde_json::from_value(value)?),
            QrCodeType::Contact => QrData::Contact(serde_json::from_value(value)?),
            QrCodeType::Event => QrData::Event(serde_json::from_value(value)?),
            QrCodeType::Mecard => QrData::Mecard(serde_json::from_value(value)?),
            other => {
                return Err(serde_json::Error::custom(format!(
                    "{} codes carry a destinationUrl, not qrData",
                    other
                )))
            }
        };

        Ok(data)
    }

    /// Whether this payload shape is the one `qr_type` expects
    pub fn fits(&self, qr_type: QrCodeType) -> bool {
        matches!(
            (self, qr_type),
            (QrData::Wifi(_), QrCodeType::Wifi)
                | (QrData::Email(_), QrCodeType::Email)
                | (QrData::Phone(_), QrCodeType::Phone)
                | (QrData::Message(_), QrCodeType::Sms | QrCodeType::Whatsapp)
                | (QrData::Location(_), QrCodeType::Location)
                | (QrData::Contact(_), QrCodeType::Contact)
                | (QrData::Event(_), QrCodeType::Event)
                | (QrData::Mecard(_), QrCodeType::Mecard)
        )
    }

    /// Required text fields that are present but blank
    pub fn blank_required_fields(&self) -> Vec<&'static str> {
        let required: Vec<(&'static str, &str)> = match self {
            QrData::Wifi(d) => vec![("ssid", d.ssid.as_str())],
            QrData::Email(d) => vec![("email", d.email.as_str())],
            QrData::Phone(d) => vec![("phone", d.phone.as_str())],
            QrData::Message(d) => vec![("phone", d.phone.as_str())],
            QrData::Location(_) => vec![],
            QrData::Contact(d) => vec![
                ("firstName", d.first_name.as_str()),
                ("lastName", d.last_name.as_str()),
            ],
            QrData::Event(d) => vec![("title", d.title.as_str())],
            QrData::Mecard(d) => vec![("name", d.name.as_str())],
        };

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect()
    }
}

/// Body of `POST /public/qr`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub qr_type: QrCodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<QrData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_design: Option<CustomDesign>,
}

impl CreateQrRequest {
    /// A URL-like code pointing at `destination_url`
    pub fn link(
        name: impl Into<String>,
        qr_type: QrCodeType,
        destination_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            qr_type,
            destination_url: Some(destination_url.into()),
            short_code: None,
            qr_data: None,
            password: None,
            expires_at: None,
            scan_limit: None,
            custom_design: None,
        }
    }

    /// A structured code carrying `data`
    pub fn structured(name: impl Into<String>, qr_type: QrCodeType, data: QrData) -> Self {
        Self {
            name: name.into(),
            qr_type,
            destination_url: None,
            short_code: None,
            qr_data: Some(data),
            password: None,
            expires_at: None,
            scan_limit: None,
            custom_design: None,
        }
    }

    /// Builder method: set a custom short code
    pub fn short_code(mut self, short_code: impl Into<String>) -> Self {
        self.short_code = Some(short_code.into());
        self
    }

    /// Builder method: require a password before redirecting
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Builder method: stop resolving scans after `at`
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Builder method: stop resolving scans after `limit` scans
    pub fn scan_limit(mut self, limit: u32) -> Self {
        self.scan_limit = Some(limit);
        self
    }

    /// Builder method: style the rendered image
    pub fn custom_design(mut self, design: CustomDesign) -> Self {
        self.custom_design = Some(design);
        self
    }
}

/// Body of `PATCH /public/qr/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQrRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateQrRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.destination_url.is_none() && self.is_active.is_none()
    }
}

/// Query string of `GET /public/qr`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// 1-indexed page number
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search_term: None,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search_term: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_link_payload_has_no_extra_fields() {
        let req = CreateQrRequest::link("Test QR", QrCodeType::Url, "https://example.com")
            .short_code("test-1");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Test QR",
                "type": "URL",
                "destinationUrl": "https://example.com",
                "shortCode": "test-1"
            })
        );
    }

    #[test]
    fn test_wifi_payload_carries_all_fields() {
        let data = QrData::Wifi(WifiData {
            ssid: "MyNetwork".to_string(),
            password: "SecurePassword123".to_string(),
            encryption: WifiEncryption::Wpa,
            hidden: false,
        });
        let req = CreateQrRequest::structured("Office WiFi", QrCodeType::Wifi, data);
        let json = serde_json::to_value(&req).unwrap();

        assert!(json.get("destinationUrl").is_none());
        let qr_data = json["qrData"].as_object().unwrap();
        assert_eq!(qr_data["ssid"], "MyNetwork");
        assert_eq!(qr_data["password"], "SecurePassword123");
        assert_eq!(qr_data["encryption"], "WPA");
        assert_eq!(qr_data["hidden"], false);
    }

    #[test]
    fn test_event_dates_are_iso8601() {
        let data = QrData::Event(EventData {
            title: "Tech Conference 2026".to_string(),
            description: None,
            location: None,
            start_date: Utc.with_ymd_and_hms(2026, 6, 15, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 6, 15, 17, 0, 0).unwrap(),
            all_day: false,
        });
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["startDate"], "2026-06-15T09:00:00Z");
        assert_eq!(json["allDay"], false);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_from_value_by_type() {
        let value = serde_json::json!({ "phone": "+1234567890", "message": "JOIN" });
        let data = QrData::from_value(QrCodeType::Whatsapp, value).unwrap();
        assert!(data.fits(QrCodeType::Whatsapp));
        assert!(data.fits(QrCodeType::Sms));
        assert!(!data.fits(QrCodeType::Phone));

        let missing = serde_json::json!({ "firstName": "John" });
        assert!(QrData::from_value(QrCodeType::Contact, missing).is_err());

        let url = serde_json::json!({ "destinationUrl": "https://example.com" });
        assert!(QrData::from_value(QrCodeType::Pdf, url).is_err());
    }

    #[test]
    fn test_blank_required_fields() {
        let data = QrData::Contact(ContactData {
            first_name: "John".to_string(),
            last_name: " ".to_string(),
            organization: None,
            title: None,
            phone: None,
            email: None,
            website: None,
            address: None,
        });
        assert_eq!(data.blank_required_fields(), vec!["lastName"]);
    }

    #[test]
    fn test_advanced_fields_only_when_set() {
        let bare = CreateQrRequest::link("Offer", QrCodeType::Coupon, "https://example.com/offer");
        let json = serde_json::to_value(&bare).unwrap();
        for key in ["password", "expiresAt", "scanLimit", "customDesign", "shortCode", "qrData"] {
            assert!(json.get(key).is_none(), "{} should be absent", key);
        }

        let gated = bare
            .password("secure123")
            .scan_limit(100)
            .expires_at(Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap());
        let json = serde_json::to_value(&gated).unwrap();
        assert_eq!(json["password"], "secure123");
        assert_eq!(json["scanLimit"], 100);
        assert_eq!(json["expiresAt"], "2026-12-31T23:59:59Z");
    }

    #[test]
    fn test_list_params_query() {
        let params = ListParams::new(2, 5);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "page": 2, "limit": 5 }));
    }
}
