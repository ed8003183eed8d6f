//! Access Token Sourcing
//!
//! gw never runs an OAuth flow itself. It picks up an already-issued access
//! token from, in order: `--access-token` / `GW_ACCESS_TOKEN`, the configured
//! token file, or the configured token command.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::common::{AppError, AppResult};
use crate::config::Config;

const NO_TOKEN_HINT: &str = "No access token available. Pass --access-token, set GW_ACCESS_TOKEN, \
     or set \"token_command\" (e.g. \"gcloud auth print-access-token\") or \"access_token_file\" in ~/.gw/config.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Explicit(String),
    File(PathBuf),
    Command(String),
}

impl TokenSource {
    /// Pick the highest-precedence configured source
    pub fn select(explicit: Option<&str>, config: &Config) -> AppResult<Self> {
        if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(TokenSource::Explicit(token.to_string()));
        }
        if let Some(path) = config.access_token_path() {
            return Ok(TokenSource::File(path));
        }
        if let Some(cmd) = config.token_command.as_deref().filter(|c| !c.trim().is_empty()) {
            return Ok(TokenSource::Command(cmd.to_string()));
        }
        Err(AppError::unauthenticated(NO_TOKEN_HINT))
    }

    /// Where the token comes from, without the token itself
    pub fn describe(&self) -> String {
        match self {
            TokenSource::Explicit(_) => "--access-token".to_string(),
            TokenSource::File(path) => format!("file {}", path.display()),
            TokenSource::Command(_) => "token_command".to_string(),
        }
    }

    /// Produce the access token
    pub async fn fetch(&self) -> AppResult<String> {
        let token = match self {
            TokenSource::Explicit(token) => token.clone(),
            TokenSource::File(path) => {
                debug!("Reading access token from {}", path.display());
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    AppError::unauthenticated(format!(
                        "Failed to read access token file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
            TokenSource::Command(cmd) => {
                info!("Obtaining access token from token_command");
                run_token_command(cmd).await?
            }
        };

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::unauthenticated("Access token source produced an empty token"));
        }
        Ok(token)
    }
}

async fn run_token_command(cmd: &str) -> AppResult<String> {
    #[cfg(windows)]
    let mut command = {
        let mut c = tokio::process::Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    };
    #[cfg(not(windows))]
    let mut command = {
        let mut c = tokio::process::Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    let output = command
        .output()
        .await
        .map_err(|e| AppError::unauthenticated(format!("Failed to run token_command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::unauthenticated(format!(
            "token_command exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_select_precedence() {
        let config = Config {
            token_command: Some("gcloud auth print-access-token".to_string()),
            access_token_file: Some(PathBuf::from("/tmp/gw-token")),
            ..Config::default()
        };

        assert_eq!(
            TokenSource::select(Some("ya29.abc"), &config).unwrap(),
            TokenSource::Explicit("ya29.abc".to_string())
        );
        assert_eq!(
            TokenSource::select(Some("  "), &config).unwrap(),
            TokenSource::File(PathBuf::from("/tmp/gw-token"))
        );

        let command_only = Config {
            access_token_file: None,
            ..config
        };
        assert_eq!(
            TokenSource::select(None, &command_only).unwrap(),
            TokenSource::Command("gcloud auth print-access-token".to_string())
        );
    }

    #[test]
    fn test_select_without_source() {
        let err = TokenSource::select(None, &Config::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert!(err.message.contains("GW_ACCESS_TOKEN"));
    }

    #[tokio::test]
    async fn test_fetch_from_file_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "ya29.file-token\n").unwrap();

        let token = TokenSource::File(path).fetch().await.unwrap();
        assert_eq!(token, "ya29.file-token");
    }

    #[tokio::test]
    async fn test_fetch_empty_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();

        let err = TokenSource::File(path).fetch().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_from_command() {
        let token = TokenSource::Command("echo ya29.cmd-token".to_string())
            .fetch()
            .await
            .unwrap();
        assert_eq!(token, "ya29.cmd-token");

        let err = TokenSource::Command("exit 3".to_string()).fetch().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }
}
