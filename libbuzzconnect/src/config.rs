//! Configuration management for BuzzConnect

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const DEFAULT_API_URL: &str = "https://mgabuzzconnect.com";

/// Offset appended to scheduled timestamps (the backend schedules in IST)
pub const DEFAULT_TIMEZONE_OFFSET: &str = "+05:30";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Crop and scale images to the platform's preferred dimensions before upload
    #[serde(default = "default_true")]
    pub auto_resize: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_category() -> String {
    "other".to_string()
}

fn default_timezone_offset() -> String {
    DEFAULT_TIMEZONE_OFFSET.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            category: default_category(),
            timezone_offset: default_timezone_offset(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { auto_resize: true }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error; the built-in defaults are used instead.
    /// `BUZZ_API_URL` overrides `api.base_url` either way.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var("BUZZ_API_URL") {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL with trailing slashes removed
    pub fn api_base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }

        let sample = format!("2000-01-01T00:00:00{}", self.defaults.timezone_offset);
        if chrono::DateTime::parse_from_rfc3339(&sample).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "defaults.timezone_offset".to_string(),
                reason: format!(
                    "'{}' is not an offset like +05:30",
                    self.defaults.timezone_offset
                ),
            }
            .into());
        }

        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("BUZZ_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("buzzconnect").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("BUZZ_DATA_DIR") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("buzzconnect"))
}
