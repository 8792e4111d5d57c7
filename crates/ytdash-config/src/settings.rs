//! Application configuration structures

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;
use ytdash_common::youtube::{YouTubeConfig, DEFAULT_BASE_URL};

use crate::loader::ConfigError;
use crate::validation::{
    validate_date_format, validate_file_path, validate_log_level, validate_timezone,
    CHANNEL_ID_REGEX,
};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API configuration
    #[validate]
    pub youtube: YouTubeSettings,

    /// Presentation settings
    #[validate]
    pub display: DisplaySettings,

    /// Logging configuration
    #[validate]
    pub logging: LoggingSettings,
}

/// YouTube Data API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct YouTubeSettings {
    /// API key; only commands that call the API require it
    pub api_key: String,

    /// Channel whose videos are listed
    pub channel_id: String,

    /// API root
    #[validate(url(message = "YouTube base URL must be a valid URL"))]
    pub base_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Extra attempts after a transient failure of a whole fetch
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Outbound requests per second
    #[validate(range(min = 1, max = 100, message = "Rate limit must be between 1 and 100 requests per second"))]
    pub rate_limit_per_second: u32,

    /// Items requested from the uploads playlist
    #[validate(range(min = 1, max = 50, message = "Uploads page size must be between 1 and 50"))]
    pub uploads_page_size: u32,

    /// Items requested from each live/upcoming search
    #[validate(range(min = 1, max = 50, message = "Search page size must be between 1 and 50"))]
    pub search_page_size: u32,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DisplaySettings {
    /// IANA zone used for rendering and for calendar-day boundaries
    #[validate(custom(function = "validate_timezone", message = "Timezone must be a valid IANA name"))]
    pub timezone: String,

    /// strftime pattern for published dates
    #[validate(custom(function = "validate_date_format", message = "Date format is not a valid strftime pattern"))]
    pub date_format: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Standard,
    Compact,
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    #[validate(custom(function = "validate_file_path", message = "Log file path contains invalid characters"))]
    pub file: Option<String>,

    /// Whether to use colored output (for console logging)
    pub colored: bool,

    /// Output format
    pub format: LogFormat,

    /// Whether to log span open/close events
    pub include_spans: bool,
}

impl Default for YouTubeSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            channel_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 0,
            rate_limit_per_second: 10,
            uploads_page_size: 50,
            search_page_size: 10,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            colored: true,
            format: LogFormat::Standard,
            include_spans: false,
        }
    }
}

impl Config {
    /// Check the settings needed to call the API.
    ///
    /// Loading succeeds without credentials so that offline commands work;
    /// commands that fetch call this first.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.youtube.api_key.trim().is_empty() {
            return Err(ConfigError::MissingConfig(
                "youtube.api_key (or YOUTUBE_API_KEY)".to_string(),
            ));
        }

        if self.youtube.channel_id.trim().is_empty() {
            return Err(ConfigError::MissingConfig(
                "youtube.channel_id (or YOUTUBE_CHANNEL_ID)".to_string(),
            ));
        }

        if !CHANNEL_ID_REGEX.is_match(&self.youtube.channel_id) {
            return Err(ConfigError::InvalidValue {
                field: "youtube.channel_id".to_string(),
                message: format!("'{}' is not a channel id", self.youtube.channel_id),
            });
        }

        Ok(())
    }
}

impl YouTubeSettings {
    /// Build the API client configuration
    pub fn client_config(&self) -> YouTubeConfig {
        YouTubeConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout_seconds)
            .with_rate_limit(self.rate_limit_per_second)
            .with_page_sizes(self.uploads_page_size, self.search_page_size)
    }
}

impl DisplaySettings {
    /// Parsed display zone; UTC if the name is unknown
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }
}

impl LoggingSettings {
    /// Build the subscriber configuration, optionally overriding the level
    pub fn to_logging_config(&self, level_override: Option<&str>) -> ytdash_common::LoggingConfig {
        ytdash_common::LoggingConfig {
            level: level_override.unwrap_or(&self.level).to_string(),
            json_format: self.format == LogFormat::Json,
            compact_format: self.format == LogFormat::Compact,
            pretty_format: self.format == LogFormat::Pretty,
            colored: self.colored,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            ..Default::default()
        }
    }
}
