//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use validator::Validate;
use ytdash_common::Result as YtDashResult;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "YTDASH_CONFIG_PATH";

/// Files searched in the working directory, in order
const DEFAULT_CONFIG_FILES: [&str; 3] = ["config.yaml", "config.yml", "config.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// A value passed syntactic validation but is unusable
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// File extension is neither YAML nor TOML
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for ytdash_common::YtDashError {
    fn from(err: ConfigError) -> Self {
        ytdash_common::YtDashError::config_with_source(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with(path, |var| env::var(var).ok())
    }

    /// Load configuration from a file, reading overrides through `lookup`
    pub fn load_config_with<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = Self::parse_file(path)?;
        debug!("Loaded configuration from {}", path.display());

        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from environment variables and files
    pub fn load() -> YtDashResult<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::load_config(&config_path)?
        } else if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .find(|name| Path::new(name).exists())
        {
            Self::load_config(path)?
        } else {
            debug!("No configuration file found, using defaults");
            Self::load_defaults_with(|var| env::var(var).ok())?
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> YtDashResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Build the default configuration with overrides applied
    pub fn load_defaults_with<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a file, choosing the format by extension
    fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        // Check the format before touching the file so the error names the real problem
        match extension.as_str() {
            "yaml" | "yml" => {
                let content = std::fs::read_to_string(path)?;
                Ok(serde_yaml::from_str(&content)?)
            }
            "toml" => {
                let content = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&content)?)
            }
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // YouTube configuration overrides
        if let Some(api_key) = lookup("YOUTUBE_API_KEY") {
            config.youtube.api_key = api_key;
        }

        if let Some(channel_id) = lookup("YOUTUBE_CHANNEL_ID") {
            config.youtube.channel_id = channel_id;
        }

        if let Some(base_url) = lookup("YOUTUBE_BASE_URL") {
            config.youtube.base_url = base_url;
        }

        if let Some(timeout) = lookup("YOUTUBE_TIMEOUT") {
            config.youtube.timeout_seconds = parse_var("YOUTUBE_TIMEOUT", &timeout)?;
        }

        if let Some(retries) = lookup("YOUTUBE_MAX_RETRIES") {
            config.youtube.max_retries = parse_var("YOUTUBE_MAX_RETRIES", &retries)?;
        }

        if let Some(rate_limit) = lookup("YOUTUBE_RATE_LIMIT") {
            config.youtube.rate_limit_per_second = parse_var("YOUTUBE_RATE_LIMIT", &rate_limit)?;
        }

        // Display configuration overrides
        if let Some(timezone) = lookup("DISPLAY_TIMEZONE") {
            config.display.timezone = timezone;
        }

        // Logging configuration overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file = Some(file);
        }

        if let Some(colored) = lookup("LOG_COLORED") {
            config.logging.colored = parse_var("LOG_COLORED", &colored)?;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
