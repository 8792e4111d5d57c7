//! Common types used across ytdash

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the application
pub type Timestamp = DateTime<Utc>;

/// Classification of a channel item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VideoType {
    Video,
    Short,
    Live,
    Upcoming,
    Stream,
}

impl VideoType {
    /// All variants in display order
    pub const ALL: [VideoType; 5] = [
        VideoType::Video,
        VideoType::Short,
        VideoType::Live,
        VideoType::Stream,
        VideoType::Upcoming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Video => "Video",
            VideoType::Short => "Short",
            VideoType::Live => "Live",
            VideoType::Upcoming => "Upcoming",
            VideoType::Stream => "Stream",
        }
    }
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoType {
    type Err = crate::YtDashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(VideoType::Video),
            "short" => Ok(VideoType::Short),
            "live" => Ok(VideoType::Live),
            "upcoming" => Ok(VideoType::Upcoming),
            "stream" => Ok(VideoType::Stream),
            other => Err(crate::YtDashError::validation_field(
                format!("unknown video type '{}'", other),
                "video_type",
            )),
        }
    }
}

/// Normalized view of one channel item, produced by the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: Option<String>,
    pub link: String,
    /// Absolute publish instant; display zones are applied only when rendering
    pub published_at: Timestamp,
    pub view_count: u64,
    pub duration_seconds: u64,
    #[serde(rename = "type")]
    pub video_type: VideoType,
}

impl VideoSummary {
    /// Watch URL for a video id
    pub fn watch_url(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", id)
    }
}

/// Channel metadata shown by the `channel` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: Option<Timestamp>,
    pub country: Option<String>,
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub view_count: Option<u64>,
    pub keywords: Option<String>,
    pub uploads_playlist_id: Option<String>,
}
