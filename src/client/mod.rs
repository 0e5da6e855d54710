//! QR management API client
//!
//! HTTP client for the `/public/qr` endpoints and API key management.
//! Every call is a single request: no retries, no backoff. Responses are
//! unwrapped from the success envelope; non-success statuses become
//! [`ClientError::Server`] carrying the error envelope.

mod api_keys;
pub mod error;

pub use error::{ClientError, ErrorKind, RateLimit, ServerError};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ApiConfig;
use crate::model::{
    ApiResponse, CreateQrRequest, ListParams, Page, PageMeta, QrAnalytics, QrCode,
    UpdateQrRequest,
};

/// How the API key is attached to requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `X-API-Key: <key>`
    #[default]
    Header,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `?apiKey=<key>`
    Query,
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthScheme::Header => "header",
            AuthScheme::Bearer => "bearer",
            AuthScheme::Query => "query",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "header" | "x-api-key" => Ok(AuthScheme::Header),
            "bearer" => Ok(AuthScheme::Bearer),
            "query" => Ok(AuthScheme::Query),
            _ => Err(format!(
                "Invalid auth scheme: {}. Use header, bearer, or query",
                s
            )),
        }
    }
}

/// Configuration for [`QrApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including `/api/v1`, e.g. "https://qr.scanalyzr.com/api/v1"
    pub base_url: String,
    pub api_key: String,
    pub auth_scheme: AuthScheme,
    /// `None` keeps the HTTP client default
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            auth_scheme: AuthScheme::default(),
            request_timeout: None,
        }
    }

    /// Build from the `[api]` config section; fails when no key is set
    pub fn from_api_config(api: &ApiConfig) -> Result<Self, ClientError> {
        let api_key = api.api_key().ok_or(ClientError::MissingApiKey)?;
        Ok(Self {
            base_url: api.base_url.clone(),
            api_key: api_key.to_string(),
            auth_scheme: api.auth_scheme,
            request_timeout: api.request_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }
}

/// The QR operations the dashboard views depend on
#[async_trait]
pub trait QrApi: Send + Sync {
    /// `POST /public/qr`
    async fn create_qr(&self, request: &CreateQrRequest) -> Result<QrCode, ClientError>;

    /// `GET /public/qr?page=&limit=`
    async fn list_qr(&self, params: &ListParams) -> Result<Page<QrCode>, ClientError>;

    /// `GET /public/qr/:id`
    async fn get_qr(&self, id: &str) -> Result<QrCode, ClientError>;

    /// `PATCH /public/qr/:id`
    async fn update_qr(&self, id: &str, update: &UpdateQrRequest) -> Result<QrCode, ClientError>;

    /// `DELETE /public/qr/:id`
    async fn delete_qr(&self, id: &str) -> Result<(), ClientError>;

    /// `GET /public/qr/:id/analytics`
    async fn qr_analytics(&self, id: &str) -> Result<QrAnalytics, ClientError>;
}

/// QR management API client
pub struct QrApiClient {
    client: Client,
    config: ClientConfig,
}

impl QrApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Client for the `[api]` config section
    pub fn from_config(api: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_api_config(api)?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn qr_url(&self, id: &str) -> String {
        self.url(&format!("/public/qr/{}", urlencoding::encode(id)))
    }

    /// Start a request with authentication attached
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        let key = self.config.api_key.as_str();
        match self.config.auth_scheme {
            AuthScheme::Header => builder.header("X-API-Key", key),
            AuthScheme::Bearer => builder.bearer_auth(key),
            AuthScheme::Query => builder.query(&[("apiKey", key)]),
        }
    }

    /// Send a request and return the raw response, mapping transport errors
    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        // The path only: query auth would otherwise leak the key into logs
        let target = format!(
            "{}{}",
            request.url().origin().ascii_serialization(),
            request.url().path()
        );

        tracing::debug!("{} {}", method, target);

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, target, e);
            if e.is_timeout() {
                ClientError::Timeout
            } else if e.is_connect() {
                ClientError::Unavailable {
                    url: self.config.base_url.clone(),
                }
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        tracing::debug!("{} {} -> {}", method, target, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        let error = ServerError::from_response(status.as_u16(), &headers, &body);
        tracing::warn!("{} {} -> {}: {}", method, target, status.as_u16(), error);

        Err(ClientError::Server(error))
    }

    /// Send a request and unwrap the success envelope
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send_with_status(builder).await.map(|sent| sent.data)
    }

    /// Like [`Self::send`], keeping the status the response arrived with
    async fn send_with_status<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Sent<ApiResponse<T>>, ClientError> {
        let response = self.execute(builder).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let data = serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(Sent { status, data })
    }

    /// Confirm the key is accepted: a bare `GET /public/qr` with the key in
    /// `X-API-Key`, whatever scheme the client is configured with
    pub async fn verify_key(&self) -> Result<(), ClientError> {
        let url = self.url("/public/qr");
        let builder = self
            .client
            .get(&url)
            .header("X-API-Key", self.config.api_key.as_str());
        self.execute(builder).await.map(|_| ())
    }

    // ==================== Calls with status ====================

    /// `POST /public/qr`, with the response status
    pub async fn create_qr_with_status(
        &self,
        request: &CreateQrRequest,
    ) -> Result<Sent<QrCode>, ClientError> {
        let url = self.url("/public/qr");
        let sent: Sent<ApiResponse<QrCode>> = self
            .send_with_status(self.request(Method::POST, &url).json(request))
            .await?;
        Ok(sent.map(|resp| resp.data))
    }

    /// `GET /public/qr`, with the response status
    pub async fn list_qr_with_status(
        &self,
        params: &ListParams,
    ) -> Result<Sent<Page<QrCode>>, ClientError> {
        let url = self.url("/public/qr");
        let sent: Sent<ApiResponse<Vec<QrCode>>> = self
            .send_with_status(self.request(Method::GET, &url).query(params))
            .await?;

        Ok(sent.map(|resp| {
            // Servers that omit meta get one synthesized from the request
            let meta = resp.meta.unwrap_or(PageMeta {
                page: params.page,
                limit: params.limit,
                total: resp.data.len() as u64,
            });
            Page {
                items: resp.data,
                meta,
            }
        }))
    }

    /// `PATCH /public/qr/:id`, with the response status
    pub async fn update_qr_with_status(
        &self,
        id: &str,
        update: &UpdateQrRequest,
    ) -> Result<Sent<QrCode>, ClientError> {
        let url = self.qr_url(id);
        let sent: Sent<ApiResponse<QrCode>> = self
            .send_with_status(self.request(Method::PATCH, &url).json(update))
            .await?;
        Ok(sent.map(|resp| resp.data))
    }

    /// `DELETE /public/qr/:id`, with the response status
    pub async fn delete_qr_with_status(&self, id: &str) -> Result<Sent<()>, ClientError> {
        let url = self.qr_url(id);
        // Body content is not needed, and some deployments answer 204
        let response = self.execute(self.request(Method::DELETE, &url)).await?;
        Ok(Sent {
            status: response.status().as_u16(),
            data: (),
        })
    }

    /// `GET /public/qr/:id/analytics`, with the response status
    pub async fn qr_analytics_with_status(&self, id: &str) -> Result<Sent<QrAnalytics>, ClientError> {
        let url = format!("{}/analytics", self.qr_url(id));
        let sent: Sent<ApiResponse<QrAnalytics>> =
            self.send_with_status(self.request(Method::GET, &url)).await?;
        Ok(sent.map(|resp| resp.data))
    }
}

/// Decoded response data and the HTTP status it came with
#[derive(Debug, Clone)]
pub struct Sent<T> {
    pub status: u16,
    pub data: T,
}

impl<T> Sent<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sent<U> {
        Sent {
            status: self.status,
            data: f(self.data),
        }
    }
}

#[async_trait]
impl QrApi for QrApiClient {
    async fn create_qr(&self, request: &CreateQrRequest) -> Result<QrCode, ClientError> {
        self.create_qr_with_status(request).await.map(|sent| sent.data)
    }

    async fn list_qr(&self, params: &ListParams) -> Result<Page<QrCode>, ClientError> {
        self.list_qr_with_status(params).await.map(|sent| sent.data)
    }

    async fn get_qr(&self, id: &str) -> Result<QrCode, ClientError> {
        let url = self.qr_url(id);
        let resp: ApiResponse<QrCode> = self.send(self.request(Method::GET, &url)).await?;
        Ok(resp.data)
    }

    async fn update_qr(&self, id: &str, update: &UpdateQrRequest) -> Result<QrCode, ClientError> {
        self.update_qr_with_status(id, update).await.map(|sent| sent.data)
    }

    async fn delete_qr(&self, id: &str) -> Result<(), ClientError> {
        self.delete_qr_with_status(id).await.map(|_| ())
    }

    async fn qr_analytics(&self, id: &str) -> Result<QrAnalytics, ClientError> {
        self.qr_analytics_with_status(id).await.map(|sent| sent.data)
    }
}
