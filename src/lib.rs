//! # qrpanel
//!
//! Client dashboard for a hosted QR code management API: create dynamic QR
//! codes of 19 types, list and edit them, read their scan analytics and
//! manage API keys.
//!
//! ## Features
//!
//! - **Typed wire model**: every QR type and its `qrData` payload as Rust types
//! - **API client**: one request per call, server messages surfaced verbatim
//! - **Dashboard state**: settings, create form, paginated list, analytics
//! - **Stub server**: in-memory Axum implementation of the HTTP contract
//! - **Docs**: API reference and per-type guides with example payloads
//!
//! ## Modules
//!
//! - [`model`]: Wire types and envelopes
//! - [`client`]: HTTP client for QR codes and API keys
//! - [`dashboard`]: View state behind the `qrpanel` commands
//! - [`stub`]: Local stub of the service
//! - [`docs`]: API reference and type guides
//! - [`render`]: Table, JSON and CSV output
//! - [`scripts`]: One-shot manual test scripts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrpanel::client::{ClientConfig, QrApi, QrApiClient};
//! use qrpanel::model::{CreateQrRequest, QrCodeType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QrApiClient::new(ClientConfig::new(
//!         "https://qr.scanalyzr.com/api/v1",
//!         "qr_live_your_key",
//!     ))?;
//!
//!     let qr = client
//!         .create_qr(&CreateQrRequest::link("Website", QrCodeType::Url, "https://example.com"))
//!         .await?;
//!
//!     println!("{} -> {}", qr.short_url, qr.qr_code_url);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dashboard;
pub mod docs;
pub mod model;
pub mod render;
pub mod scripts;
pub mod stub;
pub mod telemetry;

// Re-export top-level types for convenience
pub use client::{AuthScheme, ClientConfig, ClientError, ErrorKind, QrApi, QrApiClient, Sent};

pub use config::{Config, ConfigError, LoggingConfig, StubConfig};

pub use dashboard::{
    AnalyticsPanel, ConnectionSettings, CreateForm, DashboardError, QrListView,
};

pub use model::{
    ApiKey, CreateQrRequest, CustomDesign, PageMeta, QrAnalytics, QrCode, QrCodeType, QrData,
    UpdateQrRequest,
};

pub use stub::{build_router, serve, StubError, StubState};
