//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! The `[api]` section doubles as the dashboard's persisted connection
//! settings: a validated API key and base URL are written back to the same
//! TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::AuthScheme;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stub: StubConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection to the QR management service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// No timeout beyond the HTTP client default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

pub const DEFAULT_BASE_URL: &str = "https://qr.scanalyzr.com/api/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            auth_scheme: AuthScheme::default(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// API key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Stub server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubConfig {
    #[serde(default = "default_stub_host")]
    pub host: String,

    #[serde(default = "default_stub_port")]
    pub port: u16,

    /// Keys accepted at startup, each one its own account
    #[serde(default = "default_stub_keys")]
    pub api_keys: Vec<String>,

    /// QR codes allowed per account before 403
    #[serde(default = "default_plan_limit")]
    pub plan_limit: usize,

    /// Requests per key per minute before 429
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Domain used to build short URLs, defaults to the listen address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

fn default_stub_host() -> String {
    "127.0.0.1".to_string()
}

fn default_stub_port() -> u16 {
    5000
}

fn default_stub_keys() -> Vec<String> {
    vec!["qr_test_local_dev_key".to_string()]
}

fn default_plan_limit() -> usize {
    10
}

fn default_rate_limit() -> u32 {
    100
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            host: default_stub_host(),
            port: default_stub_port(),
            api_keys: default_stub_keys(),
            plan_limit: default_plan_limit(),
            rate_limit_per_minute: default_rate_limit(),
            public_url: None,
        }
    }
}

impl StubConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base for `shortUrl` and `qrCodeUrl`
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.addr()))
            .trim_end_matches('/')
            .to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Default config file location: `<config_dir>/qrpanel/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("qrpanel").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./qrpanel.toml"))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load a file if it exists, defaults otherwise. No environment overrides.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Write the configuration back to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("QRPANEL_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(key) = std::env::var("QRPANEL_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Ok(scheme) = std::env::var("QRPANEL_AUTH_SCHEME") {
            match scheme.parse() {
                Ok(s) => self.api.auth_scheme = s,
                Err(e) => tracing::warn!("Ignoring QRPANEL_AUTH_SCHEME: {}", e),
            }
        }

        // Stub overrides
        if let Ok(host) = std::env::var("QRPANEL_STUB_HOST") {
            self.stub.host = host;
        }
        if let Ok(port) = std::env::var("QRPANEL_STUB_PORT") {
            if let Ok(p) = port.parse() {
                self.stub.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("QRPANEL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("QRPANEL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to serialize config: {error}")]
    Serialize { error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# qrpanel Configuration
#
# Environment variables override these settings:
# - QRPANEL_API_URL
# - QRPANEL_API_KEY
# - QRPANEL_AUTH_SCHEME
# - QRPANEL_STUB_HOST
# - QRPANEL_STUB_PORT
# - QRPANEL_LOG_LEVEL
# - QRPANEL_LOG_FORMAT

[api]
# Base URL of the QR management API (including /api/v1)
base_url = "https://qr.scanalyzr.com/api/v1"

# API key, written here by `qrpanel configure` once validated
# api_key = "qr_live_your_api_key_here"

# How the key is sent: header (X-API-Key), bearer, or query (?apiKey=)
auth_scheme = "header"

# Request timeout in seconds (unset = HTTP client default)
# request_timeout_secs = 30

[stub]
# Stub server host
host = "127.0.0.1"

# Stub server port
port = 5000

# API keys accepted by the stub, one account each
api_keys = ["qr_test_local_dev_key"]

# QR codes per account before "plan limit reached"
plan_limit = 10

# Requests per key per minute before 429
rate_limit_per_minute = 100

# Domain used in short URLs (default: http://host:port)
# public_url = "https://your-domain.com"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.api.api_key.is_none());
        assert_eq!(config.api.auth_scheme, AuthScheme::Header);
        assert_eq!(config.stub.port, 5000);
        assert_eq!(config.stub.plan_limit, 10);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            api_key = "qr_live_abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key(), Some("qr_live_abc"));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.api_key = Some("qr_live_saved".to_string());
        config.api.base_url = "http://localhost:5000/api/v1".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.api.api_key(), Some("qr_live_saved"));
        assert_eq!(loaded.api.base_url, "http://localhost:5000/api/v1");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.api.api_key().is_none());
    }

    #[test]
    fn test_blank_key_is_unset() {
        let api = ApiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(api.api_key().is_none());
    }

    #[test]
    fn test_stub_public_url() {
        let stub = StubConfig::default();
        assert_eq!(stub.public_url(), "http://127.0.0.1:5000");

        let custom = StubConfig {
            public_url: Some("https://your-domain.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(custom.public_url(), "https://your-domain.com");
    }
}
