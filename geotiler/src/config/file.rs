//! Configuration file handling for ~/.geotiler/config.ini.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::{FetchConfig, RenderConfig};
use crate::provider::ProviderConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Settings loaded from an INI file, defaults for anything absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    pub provider: ProviderConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.geotiler/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.geotiler).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".geotiler")
}

/// Get the path to the config file (~/.geotiler/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
