//! Configuration module for qido.
//!
//! Handles the settings file and the page size policy.

mod limits;
mod settings;

pub use limits::{LimitPolicy, DEFAULT_LIMIT, MAX_LIMIT};
pub use settings::{
    LoggingSettings, SchemaSettings, Settings, SettingsError, SettingsResult, CONFIG_FILE_NAME,
};
