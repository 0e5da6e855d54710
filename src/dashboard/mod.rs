//! Dashboard views
//!
//! Client-side state holders behind the `qrpanel` commands. Each one owns
//! the last server response it received and talks to the service through
//! [`QrApi`], so tests can swap in a fake.
//!
//! - [`settings`]: API key and base URL, validated before they are saved
//! - [`create_form`]: per-type fields assembled into a create request
//! - [`list`]: paginated listing with local delete/update/prepend
//! - [`analytics`]: scan analytics of one QR code

pub mod analytics;
pub mod create_form;
pub mod list;
pub mod settings;

pub use analytics::AnalyticsPanel;
pub use create_form::CreateForm;
pub use list::QrListView;
pub use settings::ConnectionSettings;

use thiserror::Error;

use crate::client::{ClientError, QrApi, QrApiClient};
use crate::config::{ApiConfig, ConfigError};

/// Shown when an action needs the service but no key is configured
pub const MISSING_KEY_MESSAGE: &str = "Please set your API key first";

/// Dashboard errors
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Please set your API key first")]
    MissingApiKey,

    #[error("{field} is required")]
    MissingField { field: String },

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// A service call failed; `message` is what the user sees
    #[error("{message}")]
    Request {
        message: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DashboardError {
    /// Wrap a failed call, preferring the service's own message
    pub fn request(source: ClientError, fallback: &str) -> Self {
        DashboardError::Request {
            message: source.display_message(fallback),
            source,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        DashboardError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The underlying client error, if a call failed
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            DashboardError::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Client for the configured key, `None` when no key is set
pub fn connect(api: &ApiConfig) -> Result<Option<QrApiClient>, ClientError> {
    match QrApiClient::from_config(api) {
        Ok(client) => Ok(Some(client)),
        Err(ClientError::MissingApiKey) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The service, or the "set your API key" refusal
pub(crate) fn require_api(api: Option<&dyn QrApi>) -> Result<&dyn QrApi, DashboardError> {
    api.ok_or(DashboardError::MissingApiKey)
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-process [`QrApi`] that records calls

    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::client::{ClientError, QrApi};
    use crate::model::{
        CreateQrRequest, ListParams, Page, PageMeta, QrAnalytics, QrCode, QrCodeType,
        UpdateQrRequest,
    };

    #[derive(Default)]
    pub struct FakeApi {
        pub codes: Mutex<Vec<QrCode>>,
        pub list_calls: Mutex<u32>,
    }

    pub fn sample(id: &str) -> QrCode {
        QrCode {
            id: id.to_string(),
            name: format!("QR {}", id),
            short_code: id.to_string(),
            short_url: format!("https://your-domain.com/q/{}", id),
            qr_code_url: format!("https://your-domain.com/qr/{}.png", id),
            destination_url: Some("https://example.com".to_string()),
            qr_type: QrCodeType::Url,
            qr_data: None,
            expires_at: None,
            scan_limit: None,
            custom_design: None,
            scan_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    impl FakeApi {
        pub fn with_codes(n: usize) -> Self {
            let codes = (0..n).map(|i| sample(&format!("qr{}", i))).collect();
            Self {
                codes: Mutex::new(codes),
                list_calls: Mutex::new(0),
            }
        }

        pub fn list_calls(&self) -> u32 {
            *self.list_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl QrApi for FakeApi {
        async fn create_qr(&self, request: &CreateQrRequest) -> Result<QrCode, ClientError> {
            let mut qr = sample(&format!("new{}", self.codes.lock().unwrap().len()));
            qr.name = request.name.clone();
            self.codes.lock().unwrap().insert(0, qr.clone());
            Ok(qr)
        }

        async fn list_qr(&self, params: &ListParams) -> Result<Page<QrCode>, ClientError> {
            *self.list_calls.lock().unwrap() += 1;
            let codes = self.codes.lock().unwrap();
            let skip = ((params.page - 1) * params.limit) as usize;
            Ok(Page {
                items: codes.iter().skip(skip).take(params.limit as usize).cloned().collect(),
                meta: PageMeta {
                    page: params.page,
                    limit: params.limit,
                    total: codes.len() as u64,
                },
            })
        }

        async fn get_qr(&self, id: &str) -> Result<QrCode, ClientError> {
            Ok(sample(id))
        }

        async fn update_qr(&self, id: &str, update: &UpdateQrRequest) -> Result<QrCode, ClientError> {
            let mut qr = sample(id);
            if let Some(name) = &update.name {
                qr.name = name.clone();
            }
            Ok(qr)
        }

        async fn delete_qr(&self, id: &str) -> Result<(), ClientError> {
            self.codes.lock().unwrap().retain(|q| q.id != id);
            Ok(())
        }

        async fn qr_analytics(&self, _id: &str) -> Result<QrAnalytics, ClientError> {
            Err(ClientError::Decode("not used".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_without_key() {
        assert!(connect(&ApiConfig::default()).unwrap().is_none());

        let api = ApiConfig {
            api_key: Some("qr_live_x".to_string()),
            ..Default::default()
        };
        assert!(connect(&api).unwrap().is_some());
    }

    #[test]
    fn test_missing_key_message() {
        assert_eq!(DashboardError::MissingApiKey.to_string(), MISSING_KEY_MESSAGE);
    }
}
