//! Client configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so an empty or missing file yields a usable configuration.

use crate::error::{ClubError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ASSIGNMENTS_TTL_SECS: u64 = 15;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_login_timeout_secs() -> u64 {
    DEFAULT_LOGIN_TIMEOUT_SECS
}

fn default_assignments_ttl_secs() -> u64 {
    DEFAULT_ASSIGNMENTS_TTL_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root configuration for the club client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bound on the whole login exchange.
    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,

    /// Optional bound applied to every other backend call.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Freshness window of the assignment cache.
    #[serde(default = "default_assignments_ttl_secs")]
    pub assignments_ttl_secs: u64,

    /// Clear the session whenever an authenticated call answers 401.
    #[serde(default)]
    pub logout_on_unauthorized: bool,

    /// Directory holding the durable session state.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            request_timeout_secs: None,
            assignments_ttl_secs: DEFAULT_ASSIGNMENTS_TTL_SECS,
            logout_on_unauthorized: false,
            storage_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn assignments_ttl(&self) -> Duration {
        Duration::from_secs(self.assignments_ttl_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Rejects values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ClubError::config("api_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClubError::config(format!(
                "api_url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.login_timeout_secs == 0 {
            return Err(ClubError::config("login_timeout_secs must be greater than zero"));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ClubError::config("request_timeout_secs must be greater than zero"));
        }
        if self.assignments_ttl_secs == 0 {
            return Err(ClubError::config("assignments_ttl_secs must be greater than zero"));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
