//! Path Utilities
//!
//! Path resolution for the `~/.gw/` directory.

use std::path::PathBuf;

use super::error::AppError;

/// Get the gw base directory (`~/.gw/`)
pub fn gw_dir() -> Result<PathBuf, AppError> {
    let home = dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))?;
    Ok(home.join(".gw"))
}

/// Get the default config file path (`~/.gw/config.json`)
pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(gw_dir()?.join("config.json"))
}
