//! Configuration management for the ytdash YouTube channel dashboard

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{Config, DisplaySettings, LogFormat, LoggingSettings, YouTubeSettings};
