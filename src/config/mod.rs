//! Configuration management for APTO.
//!
//! Settings come from `config.toml` in the platform config directory (or a
//! path given on the command line), then the `APTO_API_URL` environment
//! variable. A missing file means defaults.

mod settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use settings::Settings;

/// Environment variable overriding `settings.api_url`.
pub const API_URL_ENV: &str = "APTO_API_URL";

const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    NoConfigDir,

    #[error("could not create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    #[error("could not read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("could not write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("invalid configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("{0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The on-disk configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// `<config dir>/apto`.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("apto"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// `<config dir>/apto/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Apply environment overrides, then re-validate.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!(%url, "API URL overridden from environment");
                self.settings.api_url = url.trim().to_string();
            }
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}
