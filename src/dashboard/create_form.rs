//! QR creation form
//!
//! Raw text inputs, as typed by the user, turned into a
//! [`CreateQrRequest`]. Only presence and basic parsing are checked here;
//! semantic validation (lengths, ranges, uniqueness) is the service's job.
//! Blank optional inputs never reach the payload.
//!
//! Structured types take their `qrData` from `fields`, keyed by wire name
//! (`ssid`, `firstName`, `address.city`, ...).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;

use crate::client::QrApi;
use crate::dashboard::{require_api, DashboardError};
use crate::model::{
    ContactData, CreateQrRequest, CustomDesign, EmailData, EventData, LocationData, MecardData,
    MessageData, PhoneData, PostalAddress, QrCode, QrCodeType, QrData, WifiData, WifiEncryption,
};

const CREATE_FALLBACK: &str = "Failed to create QR code";

#[derive(Debug, Clone)]
pub struct CreateForm {
    pub name: String,
    pub qr_type: QrCodeType,
    pub destination_url: String,
    pub short_code: String,
    /// `qrData` inputs of structured types
    pub fields: BTreeMap<String, String>,
    pub password: String,
    pub expires_at: String,
    pub scan_limit: String,
    /// Set when advanced design options are enabled
    pub design: Option<CustomDesign>,
}

impl CreateForm {
    pub fn new(qr_type: QrCodeType) -> Self {
        Self {
            name: String::new(),
            qr_type,
            destination_url: String::new(),
            short_code: String::new(),
            fields: BTreeMap::new(),
            password: String::new(),
            expires_at: String::new(),
            scan_limit: String::new(),
            design: None,
        }
    }

    /// Set a `qrData` input
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Input keys accepted for `qr_type`, required ones first
    pub fn field_keys(qr_type: QrCodeType) -> &'static [&'static str] {
        match qr_type {
            QrCodeType::Wifi => &["ssid", "password", "encryption", "hidden"],
            QrCodeType::Email => &["email", "subject", "body"],
            QrCodeType::Phone => &["phone"],
            QrCodeType::Sms | QrCodeType::Whatsapp => &["phone", "message"],
            QrCodeType::Location => &["latitude", "longitude", "address"],
            QrCodeType::Contact => &[
                "firstName",
                "lastName",
                "organization",
                "title",
                "phone",
                "email",
                "website",
                "address.street",
                "address.city",
                "address.state",
                "address.zip",
                "address.country",
            ],
            QrCodeType::Event => &[
                "title",
                "startDate",
                "endDate",
                "description",
                "location",
                "allDay",
            ],
            QrCodeType::Mecard => &["name", "phone", "email", "url", "address"],
            _ => &[],
        }
    }

    fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn required(&self, key: &str) -> Result<String, DashboardError> {
        self.text(key).ok_or_else(|| DashboardError::missing(key))
    }

    fn flag(&self, key: &str) -> Result<bool, DashboardError> {
        match self.text(key) {
            None => Ok(false),
            Some(v) => parse_bool(&v).ok_or_else(|| {
                DashboardError::invalid(key, format!("expected true or false, got '{}'", v))
            }),
        }
    }

    fn coordinate(&self, key: &str) -> Result<f64, DashboardError> {
        let raw = self.required(key)?;
        raw.parse::<f64>()
            .map_err(|_| DashboardError::invalid(key, format!("'{}' is not a number", raw)))
    }

    fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, DashboardError> {
        let raw = self.required(key)?;
        parse_timestamp(&raw).map_err(|e| DashboardError::invalid(key, e))
    }

    /// Assemble the structured payload of a non URL-like type
    fn qr_data(&self) -> Result<QrData, DashboardError> {
        let known = Self::field_keys(self.qr_type);
        if let Some(unknown) = self.fields.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(DashboardError::invalid(
                unknown.as_str(),
                format!(
                    "not a {} field (expected one of: {})",
                    self.qr_type,
                    known.join(", ")
                ),
            ));
        }

        let data = match self.qr_type {
            QrCodeType::Wifi => {
                let encryption = match self.text("encryption") {
                    None => WifiEncryption::default(),
                    Some(e) => e
                        .parse()
                        .map_err(|msg: String| DashboardError::invalid("encryption", msg))?,
                };
                // Open networks have no password
                let password = if encryption == WifiEncryption::NoPass {
                    self.text("password").unwrap_or_default()
                } else {
                    self.required("password")?
                };
                QrData::Wifi(WifiData {
                    ssid: self.required("ssid")?,
                    password,
                    encryption,
                    hidden: self.flag("hidden")?,
                })
            }
            QrCodeType::Email => QrData::Email(EmailData {
                email: self.required("email")?,
                subject: self.text("subject"),
                body: self.text("body"),
            }),
            QrCodeType::Phone => QrData::Phone(PhoneData {
                phone: self.required("phone")?,
            }),
            QrCodeType::Sms | QrCodeType::Whatsapp => QrData::Message(MessageData {
                phone: self.required("phone")?,
                message: self.text("message"),
            }),
            QrCodeType::Location => QrData::Location(LocationData {
                latitude: self.coordinate("latitude")?,
                longitude: self.coordinate("longitude")?,
                address: self.text("address"),
            }),
            QrCodeType::Contact => {
                let address = PostalAddress {
                    street: self.text("address.street"),
                    city: self.text("address.city"),
                    state: self.text("address.state"),
                    zip: self.text("address.zip"),
                    country: self.text("address.country"),
                };
                QrData::Contact(ContactData {
                    first_name: self.required("firstName")?,
                    last_name: self.required("lastName")?,
                    organization: self.text("organization"),
                    title: self.text("title"),
                    phone: self.text("phone"),
                    email: self.text("email"),
                    website: self.text("website"),
                    address: (!address.is_empty()).then_some(address),
                })
            }
            QrCodeType::Event => QrData::Event(EventData {
                title: self.required("title")?,
                description: self.text("description"),
                location: self.text("location"),
                start_date: self.timestamp("startDate")?,
                end_date: self.timestamp("endDate")?,
                all_day: self.flag("allDay")?,
            }),
            QrCodeType::Mecard => QrData::Mecard(MecardData {
                name: self.required("name")?,
                phone: self.text("phone"),
                email: self.text("email"),
                url: self.text("url"),
                address: self.text("address"),
            }),
            other => {
                return Err(DashboardError::invalid(
                    "type",
                    format!("{} codes take a destination URL", other),
                ))
            }
        };

        Ok(data)
    }

    /// Build the request, omitting every blank optional input
    pub fn build(&self) -> Result<CreateQrRequest, DashboardError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DashboardError::missing("name"));
        }

        let mut request = if self.qr_type.is_url_like() {
            if !self.fields.is_empty() {
                return Err(DashboardError::invalid(
                    "fields",
                    format!("{} codes take a destination URL, not qrData fields", self.qr_type),
                ));
            }
            let url = self.destination_url.trim();
            if url.is_empty() {
                return Err(DashboardError::missing("destinationUrl"));
            }
            CreateQrRequest::link(name, self.qr_type, url)
        } else {
            CreateQrRequest::structured(name, self.qr_type, self.qr_data()?)
        };

        let short_code = self.short_code.trim();
        if !short_code.is_empty() {
            request = request.short_code(short_code);
        }

        if !self.password.is_empty() {
            request = request.password(self.password.clone());
        }

        let expires_at = self.expires_at.trim();
        if !expires_at.is_empty() {
            let at = parse_timestamp(expires_at)
                .map_err(|e| DashboardError::invalid("expiresAt", e))?;
            request = request.expires_at(at);
        }

        let scan_limit = self.scan_limit.trim();
        if !scan_limit.is_empty() {
            let limit = scan_limit.parse::<u32>().map_err(|_| {
                DashboardError::invalid("scanLimit", format!("'{}' is not a whole number", scan_limit))
            })?;
            request = request.scan_limit(limit);
        }

        if let Some(design) = self.design.clone().filter(|d| *d != CustomDesign::default()) {
            request = request.custom_design(design);
        }

        Ok(request)
    }

    /// Build and post the request
    pub async fn submit(&self, api: Option<&dyn QrApi>) -> Result<QrCode, DashboardError> {
        let api = require_api(api)?;
        let request = self.build()?;

        api.create_qr(&request)
            .await
            .map_err(|e| DashboardError::request(e, CREATE_FALLBACK))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// RFC 3339, or a local-looking `YYYY-MM-DDTHH:MM[:SS]` taken as UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(format!(
        "'{}' is not a timestamp (use 2025-01-31T18:00 or RFC 3339)",
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::FakeApi;
    use serde_json::json;

    fn url_form() -> CreateForm {
        let mut form = CreateForm::new(QrCodeType::Url);
        form.name = "Test QR".to_string();
        form.destination_url = "https://example.com".to_string();
        form
    }

    #[test]
    fn test_blank_optionals_are_absent() {
        let mut form = url_form();
        form.password = String::new();
        form.expires_at = "   ".to_string();
        form.scan_limit = String::new();
        form.short_code = " ".to_string();
        form.design = Some(CustomDesign::default());

        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "Test QR",
                "type": "URL",
                "destinationUrl": "https://example.com"
            })
        );
    }

    #[test]
    fn test_advanced_fields_included_when_set() {
        let mut form = url_form();
        form.password = "s3cret".to_string();
        form.expires_at = "2030-01-31T18:00".to_string();
        form.scan_limit = "100".to_string();
        form.design = Some(CustomDesign::dashboard_default());

        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(json["password"], "s3cret");
        assert_eq!(json["expiresAt"], "2030-01-31T18:00:00Z");
        assert_eq!(json["scanLimit"], 100);
        assert_eq!(json["customDesign"]["width"], 500);
        assert_eq!(json["customDesign"]["backgroundColor"], "#FFFFFF");
    }

    #[test]
    fn test_wifi_payload() {
        let mut form = CreateForm::new(QrCodeType::Wifi);
        form.name = "Office".to_string();
        form.set_field("ssid", "Office-5G");
        form.set_field("password", "hunter22");

        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(
            json["qrData"],
            json!({ "ssid": "Office-5G", "password": "hunter22", "encryption": "WPA", "hidden": false })
        );
        assert!(json.get("destinationUrl").is_none());
    }

    #[test]
    fn test_contact_payload_nests_address() {
        let mut form = CreateForm::new(QrCodeType::Contact);
        form.name = "Card".to_string();
        form.set_field("firstName", "Jane");
        form.set_field("lastName", "Doe");
        form.set_field("address.city", "Berlin");

        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(
            json["qrData"],
            json!({ "firstName": "Jane", "lastName": "Doe", "address": { "city": "Berlin" } })
        );
    }

    #[test]
    fn test_structured_payloads() {
        let cases: Vec<(QrCodeType, Vec<(&str, &str)>, serde_json::Value)> = vec![
            (
                QrCodeType::Email,
                vec![("email", "hello@example.com"), ("subject", "Hi"), ("body", " ")],
                json!({ "email": "hello@example.com", "subject": "Hi" }),
            ),
            (
                QrCodeType::Phone,
                vec![("phone", " +15555550100 ")],
                json!({ "phone": "+15555550100" }),
            ),
            (
                QrCodeType::Sms,
                vec![("phone", "+15555550100"), ("message", "STOP")],
                json!({ "phone": "+15555550100", "message": "STOP" }),
            ),
            (
                QrCodeType::Whatsapp,
                vec![("phone", "+4915112345678")],
                json!({ "phone": "+4915112345678" }),
            ),
            (
                QrCodeType::Location,
                vec![("latitude", "52.52"), ("longitude", "-13.405"), ("address", "Mitte")],
                json!({ "latitude": 52.52, "longitude": -13.405, "address": "Mitte" }),
            ),
            (
                QrCodeType::Mecard,
                vec![("name", "Jane Doe"), ("url", "https://jane.dev"), ("email", "")],
                json!({ "name": "Jane Doe", "url": "https://jane.dev" }),
            ),
            (
                QrCodeType::Wifi,
                vec![("ssid", "Guest"), ("encryption", "open"), ("hidden", "yes")],
                json!({ "ssid": "Guest", "password": "", "encryption": "nopass", "hidden": true }),
            ),
            (
                QrCodeType::Contact,
                vec![
                    ("firstName", "Jane"),
                    ("lastName", "Doe"),
                    ("organization", "Acme"),
                    ("phone", "+15555550100"),
                ],
                json!({
                    "firstName": "Jane",
                    "lastName": "Doe",
                    "organization": "Acme",
                    "phone": "+15555550100"
                }),
            ),
            (
                QrCodeType::Event,
                vec![
                    ("title", "Launch party"),
                    ("startDate", "2030-05-01T18:00"),
                    ("endDate", "2030-05-01T23:30:00+02:00"),
                    ("location", "Rooftop"),
                    ("allDay", "true"),
                ],
                json!({
                    "title": "Launch party",
                    "location": "Rooftop",
                    "startDate": "2030-05-01T18:00:00Z",
                    "endDate": "2030-05-01T21:30:00Z",
                    "allDay": true
                }),
            ),
        ];

        for (qr_type, fields, expected) in cases {
            let mut form = CreateForm::new(qr_type);
            form.name = format!("{} code", qr_type);
            for (key, value) in fields {
                form.set_field(key, value);
            }

            let json = serde_json::to_value(form.build().unwrap()).unwrap();
            assert_eq!(json["type"], qr_type.as_str(), "{}", qr_type);
            assert_eq!(json["qrData"], expected, "{}", qr_type);
            assert!(json.get("destinationUrl").is_none(), "{}", qr_type);
        }
    }

    #[test]
    fn test_event_all_day_defaults_off() {
        let mut form = CreateForm::new(QrCodeType::Event);
        form.name = "Launch".to_string();
        form.set_field("title", "Launch party");
        form.set_field("startDate", "2030-05-01 18:00");
        form.set_field("endDate", "2030-05-01 20:00");

        let json = serde_json::to_value(form.build().unwrap()).unwrap();
        assert_eq!(json["qrData"]["allDay"], false);
        assert_eq!(json["qrData"]["startDate"], "2030-05-01T18:00:00Z");
    }

    #[test]
    fn test_non_numeric_latitude_rejected() {
        let mut form = CreateForm::new(QrCodeType::Location);
        form.name = "Office".to_string();
        form.set_field("latitude", "north");
        form.set_field("longitude", "13.405");

        let err = form.build().unwrap_err();
        assert!(matches!(
            &err,
            DashboardError::InvalidField { field, .. } if field == "latitude"
        ));
        assert_eq!(err.to_string(), "Invalid latitude: 'north' is not a number");
    }

    #[test]
    fn test_event_requires_dates() {
        let mut form = CreateForm::new(QrCodeType::Event);
        form.name = "Launch".to_string();
        form.set_field("title", "Launch party");
        form.set_field("startDate", "2030-05-01T18:00");

        let err = form.build().unwrap_err();
        assert_eq!(err.to_string(), "endDate is required");
    }

    #[test]
    fn test_missing_required_fields() {
        let mut form = url_form();
        form.destination_url = String::new();
        assert_eq!(form.build().unwrap_err().to_string(), "destinationUrl is required");

        let mut form = CreateForm::new(QrCodeType::Sms);
        form.name = "Text us".to_string();
        assert_eq!(form.build().unwrap_err().to_string(), "phone is required");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut form = CreateForm::new(QrCodeType::Phone);
        form.name = "Call".to_string();
        form.set_field("phone", "+15555550100");
        form.set_field("ssid", "oops");

        assert!(matches!(
            form.build().unwrap_err(),
            DashboardError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2030-01-31T18:00:00+02:00").is_ok());
        assert!(parse_timestamp("2030-01-31 18:00").is_ok());
        assert!(parse_timestamp("next tuesday").is_err());
    }

    #[tokio::test]
    async fn test_submit_without_key() {
        let err = url_form().submit(None).await.unwrap_err();
        assert_eq!(err.to_string(), "Please set your API key first");
    }

    #[tokio::test]
    async fn test_submit_returns_created_code() {
        let api = FakeApi::default();
        let qr = url_form().submit(Some(&api)).await.unwrap();
        assert_eq!(qr.name, "Test QR");
    }
}
