//! Wire types of the QR management API
//!
//! - [`qr`]: the QR code resource and its styling
//! - [`payload`]: create/update bodies and the typed `qrData` shapes
//! - [`envelope`]: success and error envelopes, pagination
//! - [`analytics`]: scan analytics
//! - [`api_key`]: API key resource

pub mod analytics;
pub mod api_key;
pub mod envelope;
pub mod payload;
pub mod qr;

pub use analytics::{QrAnalytics, QrSummary, ScanAnalytics};
pub use api_key::{mask_key, ApiKey, CreateApiKeyRequest, UpdateApiKeyRequest};
pub use envelope::{ApiResponse, ErrorResponse, FieldError, Page, PageMeta};
pub use payload::{
    ContactData, CreateQrRequest, EmailData, EventData, ListParams, LocationData, MecardData,
    MessageData, PhoneData, PostalAddress, QrData, UpdateQrRequest, WifiData, WifiEncryption,
};
pub use qr::{CustomDesign, ErrorCorrectionLevel, QrCode, QrCodeType};
