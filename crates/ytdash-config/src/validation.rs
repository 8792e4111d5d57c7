//! Validation utilities and regex patterns

use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Channel ids are "UC" followed by 22 URL-safe base64 characters
pub static CHANNEL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^UC[0-9A-Za-z_-]{22}$").expect("Invalid channel id regex pattern")
});

/// Validate an IANA timezone name against the chrono-tz database
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.is_empty() {
        return Err(ValidationError::new("empty_timezone"));
    }

    match timezone.parse::<Tz>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("unknown_timezone")),
    }
}

/// Validate log level names accepted in configuration files
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate a chrono strftime pattern
pub fn validate_date_format(format: &str) -> Result<(), ValidationError> {
    if format.is_empty() {
        return Err(ValidationError::new("empty_date_format"));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        Err(ValidationError::new("invalid_date_format"))
    } else {
        Ok(())
    }
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_regex() {
        assert!(CHANNEL_ID_REGEX.is_match("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(CHANNEL_ID_REGEX.is_match("UCBR8-60-B28hp2BmDPdntcQ"));

        assert!(!CHANNEL_ID_REGEX.is_match(""));
        assert!(!CHANNEL_ID_REGEX.is_match("UC123")); // Too short
        assert!(!CHANNEL_ID_REGEX.is_match("UU_x5XG1OV2P6uZZ5FSM9Ttw")); // Playlist prefix
        assert!(!CHANNEL_ID_REGEX.is_match("UC_x5XG1OV2P6uZZ5FSM9Ttw1")); // Too long
        assert!(!CHANNEL_ID_REGEX.is_match("UC_x5XG1OV2P6uZZ5FSM9Tt!"));
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Asia/Bangkok").is_ok());
        assert!(validate_timezone("Europe/London").is_ok());

        assert!(validate_timezone("").is_err());
        assert!(validate_timezone("Invalid").is_err());
        assert!(validate_timezone("America/Atlantis").is_err());
    }

    #[test]
    fn test_validate_log_level() {
        for level in &["trace", "debug", "info", "warn", "error"] {
            assert!(validate_log_level(level).is_ok(), "Level {} should be valid", level);
        }
        assert!(validate_log_level("verbose").is_err());
        assert!(validate_log_level("INFO").is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("%Y-%m-%d").is_ok());
        assert!(validate_date_format("%d %b %Y %H:%M").is_ok());

        assert!(validate_date_format("").is_err());
        assert!(validate_date_format("%Q").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("/var/log/ytdash.log").is_ok());
        assert!(validate_file_path("./ytdash.log").is_ok());

        assert!(validate_file_path("").is_err());
        assert!(validate_file_path("file<name.log").is_err());
        assert!(validate_file_path("file|name.log").is_err());
    }
}
