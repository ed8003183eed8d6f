//! Configuration management
//!
//! Reads the optional JSON config file (`~/.gw/config.json` unless
//! `--config` points elsewhere). A missing default file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{config_path, AppError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at {0}")]
    Missing(String),

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::config(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell command whose stdout is an OAuth access token,
    /// e.g. `gcloud auth print-access-token`
    pub token_command: Option<String>,
    /// File containing an access token
    pub access_token_file: Option<PathBuf>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Billing project sent as `x-goog-user-project`
    pub quota_project: Option<String>,
    pub default_calendar: String,
    /// Page size requested from list endpoints
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_command: None,
            access_token_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            quota_project: None,
            default_calendar: "primary".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        match explicit {
            Some(path) => Ok(Self::load_from(path)?),
            None => {
                let path = config_path()?;
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                Ok(Self::load_from(&path)?)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::Missing(display));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The access token file with a leading `~/` expanded
    pub fn access_token_path(&self) -> Option<PathBuf> {
        let path = self.access_token_file.as_ref()?;
        match (path.strip_prefix("~"), dirs::home_dir()) {
            (Ok(rest), Some(home)) => Some(home.join(rest)),
            _ => Some(path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_calendar, "primary");
        assert!(config.token_command.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"token_command": "gcloud auth print-access-token", "timeout_secs": 5}}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.token_command.as_deref(),
            Some("gcloud auth print-access-token")
        );
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert_eq!(err.code, crate::common::ErrorCode::Config);
        assert!(err.message.contains("not found"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_access_token_path_expands_home() {
        let config = Config {
            access_token_file: Some(PathBuf::from("/tmp/token")),
            ..Config::default()
        };
        assert_eq!(config.access_token_path(), Some(PathBuf::from("/tmp/token")));
    }
}
