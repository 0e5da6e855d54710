//! Connection settings
//!
//! A key and base URL are only stored after the service accepted them on a
//! plain `GET /public/qr` carrying the key in `X-API-Key`. The file is read without environment overrides so
//! that saving never persists values that came from the environment.

use std::path::{Path, PathBuf};

use crate::client::{AuthScheme, ClientConfig, QrApiClient};
use crate::config::{ApiConfig, Config};
use crate::dashboard::DashboardError;

pub struct ConnectionSettings {
    path: PathBuf,
    config: Config,
}

impl ConnectionSettings {
    /// Read the settings file at `path`, defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        Ok(Self {
            path: path.to_path_buf(),
            config: Config::load_or_default(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored `[api]` section
    pub fn api(&self) -> &ApiConfig {
        &self.config.api
    }

    pub fn is_configured(&self) -> bool {
        self.config.api.api_key().is_some()
    }

    /// Check `api_key` against `base_url` and store both on success
    ///
    /// On failure nothing changes and the error carries the service's
    /// message, or the transport error text when there was no response.
    pub async fn test_and_save(
        &mut self,
        api_key: &str,
        base_url: &str,
    ) -> Result<(), DashboardError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(DashboardError::missing("API key"));
        }
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(DashboardError::missing("API URL"));
        }

        let client_config = ClientConfig {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            auth_scheme: AuthScheme::Header,
            request_timeout: self
                .config
                .api
                .request_timeout_secs
                .map(std::time::Duration::from_secs),
        };
        let client = QrApiClient::new(client_config).map_err(|e| {
            let message = e.to_string();
            DashboardError::Request { message, source: e }
        })?;

        if let Err(e) = client.verify_key().await {
            tracing::warn!("API key check against {} failed: {}", base_url, e);
            let message = e.to_string();
            return Err(DashboardError::Request { message, source: e });
        }

        let mut updated = self.config.clone();
        updated.api.api_key = Some(api_key.to_string());
        updated.api.base_url = base_url.to_string();
        updated.save(&self.path)?;
        self.config = updated;

        tracing::info!("Saved API settings to {:?}", self.path);
        Ok(())
    }
}
