//! One-shot manual test scripts
//!
//! Each `qr-test-*` binary makes exactly one call against the service named
//! by `API_URL` with the key in `API_KEY`, then prints what came back,
//! including the HTTP status the service answered with.
//! Only a missing id argument is a hard failure (exit code 1); service
//! errors are reported and the process still exits 0.

use std::fmt;

use thiserror::Error;

use crate::client::{ClientConfig, ClientError, QrApiClient};
use crate::config::DEFAULT_BASE_URL;
use crate::model::{
    CreateQrRequest, ListParams, Page, QrAnalytics, QrCode, QrCodeType, UpdateQrRequest,
};
use crate::render::{AnalyticsReport, QrTable};

/// Used when `API_URL` is unset, the same service the dashboard defaults to
pub const DEFAULT_API_URL: &str = DEFAULT_BASE_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Create,
    List,
    Update,
    Delete,
    Analytics,
}

impl Script {
    pub fn binary(&self) -> &'static str {
        match self {
            Script::Create => "qr-test-create",
            Script::List => "qr-test-list",
            Script::Update => "qr-test-update",
            Script::Delete => "qr-test-delete",
            Script::Analytics => "qr-test-analytics",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Script::Create => "Testing QR code creation",
            Script::List => "Testing QR code listing",
            Script::Update => "Testing QR code update",
            Script::Delete => "Testing QR code deletion",
            Script::Analytics => "Testing QR code analytics",
        }
    }

    pub fn needs_id(&self) -> bool {
        !matches!(self, Script::Create | Script::List)
    }
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Please provide a QR code ID as argument\nUsage: {0} <qr-code-id>")]
    MissingId(&'static str),

    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Where the scripts point, read from the environment
#[derive(Debug, Clone)]
pub struct ScriptEnv {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl ScriptEnv {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::var("API_URL").ok(), std::env::var("API_KEY").ok())
    }

    pub fn from_vars(api_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Client for the configured service; an unset key is sent empty so the
    /// service reports it
    pub fn client(&self) -> Result<QrApiClient, ClientError> {
        QrApiClient::new(ClientConfig::new(
            &self.api_url,
            self.api_key.clone().unwrap_or_default(),
        ))
    }
}

/// What a successful call returned
#[derive(Debug, Clone)]
pub enum Outcome {
    Created(QrCode),
    Listed(Page<QrCode>),
    Updated(QrCode),
    Deleted(String),
    Analytics(QrAnalytics),
}

/// A successful call: the status the service answered with and its data
#[derive(Debug, Clone)]
pub struct Report {
    pub status: u16,
    pub outcome: Outcome,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUCCESS!")?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f)?;

        match &self.outcome {
            Outcome::Created(qr) => {
                writeln!(f, "QR code details:")?;
                writeln!(f, "  ID:          {}", qr.id)?;
                writeln!(f, "  Short code:  {}", qr.short_code)?;
                writeln!(f, "  Short URL:   {}", qr.short_url)?;
                writeln!(
                    f,
                    "  Destination: {}",
                    qr.destination_url.as_deref().unwrap_or("-")
                )?;
                write!(f, "  QR image:    {}", qr.qr_code_url)
            }
            Outcome::Listed(page) => {
                writeln!(f, "Total QR codes: {}", page.meta.total)?;
                write!(
                    f,
                    "{}",
                    QrTable {
                        items: &page.items,
                        meta: Some(&page.meta),
                    }
                )
            }
            Outcome::Updated(qr) => {
                writeln!(f, "Updated QR code:")?;
                writeln!(f, "  Name:      {}", qr.name)?;
                writeln!(f, "  URL:       {}", qr.destination_url.as_deref().unwrap_or("-"))?;
                write!(f, "  Short URL: {}", qr.short_url)
            }
            Outcome::Deleted(id) => write!(f, "QR code {} deleted successfully", id),
            Outcome::Analytics(analytics) => write!(f, "{}", AnalyticsReport(analytics)),
        }
    }
}

/// Perform the script's single call
pub async fn execute(
    script: Script,
    client: &QrApiClient,
    id: Option<&str>,
) -> Result<Report, ScriptError> {
    let id = match (script.needs_id(), id) {
        (true, None) => return Err(ScriptError::MissingId(script.binary())),
        (_, id) => id.unwrap_or_default(),
    };

    let report = match script {
        Script::Create => {
            let mut request =
                CreateQrRequest::link("Test QR Code", QrCodeType::Url, "https://example.com");
            request.short_code = Some(format!(
                "test-qr-{}",
                chrono::Utc::now().timestamp_millis()
            ));
            let sent = client.create_qr_with_status(&request).await?;
            Report {
                status: sent.status,
                outcome: Outcome::Created(sent.data),
            }
        }
        Script::List => {
            let sent = client.list_qr_with_status(&ListParams::new(1, 5)).await?;
            Report {
                status: sent.status,
                outcome: Outcome::Listed(sent.data),
            }
        }
        Script::Update => {
            let update = UpdateQrRequest {
                name: Some("Updated Test QR Code".to_string()),
                destination_url: Some("https://updated-example.com".to_string()),
                is_active: None,
            };
            let sent = client.update_qr_with_status(id, &update).await?;
            Report {
                status: sent.status,
                outcome: Outcome::Updated(sent.data),
            }
        }
        Script::Delete => {
            let sent = client.delete_qr_with_status(id).await?;
            Report {
                status: sent.status,
                outcome: Outcome::Deleted(id.to_string()),
            }
        }
        Script::Analytics => {
            let sent = client.qr_analytics_with_status(id).await?;
            Report {
                status: sent.status,
                outcome: Outcome::Analytics(sent.data),
            }
        }
    };

    Ok(report)
}

/// Status, message and details of a failed call
pub struct Failure<'a>(pub &'a ClientError);

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FAILED!")?;
        match self.0 {
            ClientError::Server(e) => {
                writeln!(f, "Status: {}", e.status)?;
                writeln!(f, "Message: {}", e.message.as_deref().unwrap_or("-"))?;
                let details = serde_json::to_string_pretty(&e.details)
                    .unwrap_or_else(|_| e.details.to_string());
                write!(f, "Details: {}", details)
            }
            other => {
                writeln!(f, "Status: -")?;
                write!(f, "Message: {}", other)
            }
        }
    }
}

/// Entry point shared by the script binaries; returns the exit code
pub async fn run(script: Script, id: Option<String>) -> i32 {
    let env = ScriptEnv::from_env();
    println!("{}...\n", script.title());
    if let Some(id) = &id {
        println!("QR code ID: {}", id);
    }

    let client = match env.client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", Failure(&e));
            return 0;
        }
    };

    match execute(script, &client, id.as_deref()).await {
        Ok(report) => {
            println!("{}", report);
            0
        }
        Err(ScriptError::MissingId(binary)) => {
            eprintln!("{}", ScriptError::MissingId(binary));
            1
        }
        Err(ScriptError::Api(e)) => {
            eprintln!("{}", Failure(&e));
            0
        }
    }
}
