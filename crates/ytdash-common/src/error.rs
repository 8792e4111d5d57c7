//! Error types and utilities for ytdash

use thiserror::Error;

/// Result type alias for ytdash operations
pub type Result<T> = std::result::Result<T, YtDashError>;

/// Main error type for ytdash operations
#[derive(Error, Debug)]
pub enum YtDashError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport level failures (timeouts, refused connections, broken bodies)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The YouTube Data API answered with a non-success status or an error body
    #[error("YouTube API error: {message}")]
    YouTube {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An expected field was absent from an API response
    #[error("Missing data: {message}")]
    MissingData { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl YtDashError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new YouTube API error
    pub fn youtube(msg: impl Into<String>) -> Self {
        Self::YouTube {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new YouTube API error with HTTP status code
    pub fn youtube_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::YouTube {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new missing-data error
    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData {
            message: msg.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// HTTP status reported by the API, if this error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::YouTube { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Transport failures and 5xx/429 answers are transient; quota, key and
    /// request errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::YouTube {
                status_code: Some(code),
                ..
            } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Convert from reqwest::Error to YtDashError
impl From<reqwest::Error> for YtDashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from url::ParseError to YtDashError
impl From<url::ParseError> for YtDashError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source("Invalid API base URL", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = YtDashError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = YtDashError::config("config issue");
        assert_eq!(config_error.to_string(), "Configuration error: config issue");

        let api_error = YtDashError::youtube_with_status("quotaExceeded", 403);
        assert_eq!(api_error.to_string(), "YouTube API error: quotaExceeded");
        assert_eq!(api_error.status_code(), Some(403));

        let missing = YtDashError::missing_data("no uploads playlist");
        assert_eq!(missing.to_string(), "Missing data: no uploads playlist");

        let validation_error = YtDashError::validation_field("Invalid input", "channel_id");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(validation_error.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = YtDashError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());

        let config_source_error = YtDashError::config_with_source(
            "Config loading failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );
        assert!(config_source_error.to_string().contains("Config loading failed"));
        assert!(config_source_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: YtDashError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#).unwrap_err();
        let error: YtDashError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let error: YtDashError = parse_error.into();
        assert!(matches!(error, YtDashError::Config { .. }));
    }

    #[test]
    fn test_transient_classification() {
        assert!(YtDashError::network("timeout").is_transient());
        assert!(YtDashError::youtube_with_status("backend error", 503).is_transient());
        assert!(YtDashError::youtube_with_status("rate limited", 429).is_transient());
        assert!(!YtDashError::youtube_with_status("quotaExceeded", 403).is_transient());
        assert!(!YtDashError::youtube("bad body").is_transient());
        assert!(!YtDashError::missing_data("no playlist").is_transient());
    }

    #[test]
    fn test_error_chain_preservation() {
        let root_error = io::Error::new(io::ErrorKind::NotFound, "Root cause");
        let middle_error = YtDashError::config_with_source("Middle layer", root_error);
        let top_error = YtDashError::with_source("Top layer", middle_error);

        let mut current_error: &dyn std::error::Error = &top_error;
        let mut error_count = 0;
        while let Some(source) = current_error.source() {
            current_error = source;
            error_count += 1;
        }

        assert_eq!(error_count, 2);
    }
}
