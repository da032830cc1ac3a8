//! TOML-based configuration for qido.
//!
//! Example configuration:
//! ```toml
//! [limits]
//! default_limit = 100
//! max_limit = 200
//!
//! [schema]
//! name = "dbo"
//!
//! [logging]
//! level = "warn"
//! ```
//!
//! Lookup order: an explicit path, `./qido.toml`, then `qido/qido.toml`
//! under the user's config directory. With no file the defaults apply.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::limits::LimitPolicy;
use crate::schema::DEFAULT_SCHEMA;

/// File name looked up in the working and config directories.
pub const CONFIG_FILE_NAME: &str = "qido.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Page size policy.
    pub limits: LimitPolicy,

    /// Where the index tables live.
    pub schema: SchemaSettings,

    /// Log filter used when `RUST_LOG` is unset.
    pub logging: LoggingSettings,
}

/// Schema configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Schema qualifying every table reference.
    pub name: String,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCHEMA.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `"info"` or `"qido=debug"`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `explicit` if given, otherwise from the first config file
    /// found, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// First existing config file in lookup order.
    pub fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("qido").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    /// Reject settings the generator cannot work with.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.limits.default_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "limits.default_limit must be greater than 0".into(),
            ));
        }
        if self.limits.max_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "limits.max_limit must be greater than 0".into(),
            ));
        }
        if self.limits.default_limit > self.limits.max_limit {
            return Err(SettingsError::InvalidConfig(format!(
                "limits.default_limit ({}) exceeds limits.max_limit ({})",
                self.limits.default_limit, self.limits.max_limit
            )));
        }
        if self.schema.name.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "schema.name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
