//! Configuration service implementation.
//!
//! Loads the client configuration from `~/.config/freeclub/config.toml` (or an
//! explicit path) and applies `FREECLUB_*` environment overrides.

use crate::paths::ClubPaths;
use freeclub_core::config::ClientConfig;
use freeclub_core::{ClubError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

pub const ENV_API_URL: &str = "FREECLUB_API_URL";
pub const ENV_LOGIN_TIMEOUT_SECS: &str = "FREECLUB_LOGIN_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "FREECLUB_LOG_LEVEL";

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses an explicit config file (for testing and embedding).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields defaults; an unreadable or invalid file is an error.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_file()?;
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok())?;
        loaded.validate()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => ClubPaths::config_file().map_err(|e| ClubError::config(e.to_string())),
        }
    }

    fn load_file(&self) -> Result<ClientConfig> {
        let path = self.config_path()?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(ClientConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content).map_err(|e| {
            ClubError::config(format!("invalid config file {}: {}", path.display(), e))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `FREECLUB_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_url = url.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_LOGIN_TIMEOUT_SECS) {
        config.login_timeout_secs = raw.trim().parse().map_err(|_| {
            ClubError::config(format!(
                "{ENV_LOGIN_TIMEOUT_SECS} must be a number of seconds, got '{raw}'"
            ))
        })?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config.logging.level = level.trim().to_string();
    }
    Ok(())
}
