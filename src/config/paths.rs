//! Filesystem layout
//!
//! ```text
//! <base>/config.json              settings
//! <base>/changes.log              change events, one JSON object per line
//! <base>/data/transactions.json
//! <base>/data/documents.json
//! ```
//!
//! `<base>` is `DEALTRACK_DATA_DIR` when set, otherwise
//! `$XDG_CONFIG_HOME/dealtrack` (falling back to `~/.config/dealtrack`), or
//! `%APPDATA%\dealtrack` on Windows.

use std::path::{Path, PathBuf};

use crate::error::DealError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "DEALTRACK_DATA_DIR";

#[derive(Debug, Clone)]
pub struct DealPaths {
    base_dir: PathBuf,
}

impl DealPaths {
    /// Resolve the base directory from the environment
    pub fn new() -> Result<Self, DealError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => platform_base_dir()?,
        };
        Ok(Self::with_base_dir(base_dir))
    }

    /// Use an explicit base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn change_log(&self) -> PathBuf {
        self.base_dir.join("changes.log")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn documents_file(&self) -> PathBuf {
        self.data_dir().join("documents.json")
    }

    /// Create the base and data directories if missing
    pub fn ensure_directories(&self) -> Result<(), DealError> {
        for dir in [self.base_dir.clone(), self.data_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                DealError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Settings have been written at least once
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn platform_base_dir() -> Result<PathBuf, DealError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("dealtrack"));
    }
    let home = std::env::var_os("HOME").ok_or_else(|| {
        DealError::Config(format!(
            "Could not determine home directory; set {}",
            DATA_DIR_ENV
        ))
    })?;
    Ok(PathBuf::from(home).join(".config").join("dealtrack"))
}

#[cfg(windows)]
fn platform_base_dir() -> Result<PathBuf, DealError> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| DealError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("dealtrack"))
}
