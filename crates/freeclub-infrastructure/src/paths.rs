//! Unified path management for freeclub files.
//!
//! Paths are resolved via AppPaths from the version-migrate crate, which picks
//! the platform's config directory (XDG on Linux/macOS, AppData on Windows).

use std::path::PathBuf;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for freeclub.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/freeclub/          # Config directory (AppPaths default)
/// ├── config.toml              # Client configuration
/// └── session/                 # Durable session state, one file per key
///     ├── freeclub.identity
///     └── freeclub.token
/// ```
pub struct ClubPaths;

impl ClubPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("freeclub")
    }

    /// Returns the freeclub configuration directory (e.g. `~/.config/freeclub/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to config.toml.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory for durable session state.
    pub fn session_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = ClubPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("freeclub"));
    }

    #[test]
    fn test_config_file() {
        let config_file = ClubPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = ClubPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_session_dir() {
        let session_dir = ClubPaths::session_dir().unwrap();
        assert!(session_dir.ends_with("session"));
        let config_dir = ClubPaths::config_dir().unwrap();
        assert!(session_dir.starts_with(&config_dir));
    }
}
