//! Test utilities and shared fixtures for the ytdash workspace.
//!
//! Enabled with the `testing` feature so that other crates can build API
//! records and summaries without repeating JSON fixtures.

use crate::types::{Timestamp, VideoSummary, VideoType};
use crate::youtube::{
    LiveBroadcastContent, LiveStreamingDetails, Thumbnail, Thumbnails, VideoContentDetails,
    VideoResource, VideoSnippet, VideoStatistics,
};
use chrono::{TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests; safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a UTC timestamp.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Builder for `videos` endpoint records
#[derive(Debug, Clone)]
pub struct VideoResourceBuilder {
    resource: VideoResource,
}

/// Start a record with a title, a publish time, a 10 minute duration and no views
pub fn video_resource(id: &str) -> VideoResourceBuilder {
    VideoResourceBuilder {
        resource: VideoResource {
            id: id.to_string(),
            snippet: Some(VideoSnippet {
                published_at: Some("2024-05-01T10:00:00Z".to_string()),
                channel_id: Some("UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string()),
                title: format!("Video {}", id),
                channel_title: "Test Channel".to_string(),
                thumbnails: None,
                live_broadcast_content: LiveBroadcastContent::None,
            }),
            content_details: Some(VideoContentDetails {
                duration: Some("PT10M".to_string()),
            }),
            statistics: Some(VideoStatistics {
                view_count: Some("0".to_string()),
                like_count: None,
                comment_count: None,
            }),
            live_streaming_details: None,
        },
    }
}

impl VideoResourceBuilder {
    fn snippet(&mut self) -> &mut VideoSnippet {
        self.resource.snippet.get_or_insert_with(|| VideoSnippet {
            published_at: None,
            channel_id: None,
            title: String::new(),
            channel_title: String::new(),
            thumbnails: None,
            live_broadcast_content: LiveBroadcastContent::None,
        })
    }

    pub fn title(mut self, title: &str) -> Self {
        self.snippet().title = title.to_string();
        self
    }

    pub fn published_at(mut self, published_at: &str) -> Self {
        self.snippet().published_at = Some(published_at.to_string());
        self
    }

    pub fn broadcast(mut self, status: LiveBroadcastContent) -> Self {
        self.snippet().live_broadcast_content = status;
        self
    }

    pub fn thumbnails(mut self, thumbnails: &[(&str, &str)]) -> Self {
        let mut set = Thumbnails::default();
        for (size, url) in thumbnails {
            let thumbnail = Some(Thumbnail {
                url: url.to_string(),
                width: None,
                height: None,
            });
            match *size {
                "maxres" => set.maxres = thumbnail,
                "standard" => set.standard = thumbnail,
                "high" => set.high = thumbnail,
                "medium" => set.medium = thumbnail,
                _ => set.default = thumbnail,
            }
        }
        self.snippet().thumbnails = Some(set);
        self
    }

    pub fn duration(mut self, duration: &str) -> Self {
        self.resource.content_details = Some(VideoContentDetails {
            duration: Some(duration.to_string()),
        });
        self
    }

    pub fn views(mut self, views: &str) -> Self {
        self.resource.statistics = Some(VideoStatistics {
            view_count: Some(views.to_string()),
            like_count: None,
            comment_count: None,
        });
        self
    }

    pub fn without_statistics(mut self) -> Self {
        self.resource.statistics = None;
        self
    }

    pub fn streamed(mut self) -> Self {
        self.resource.live_streaming_details = Some(LiveStreamingDetails {
            actual_start_time: Some("2024-05-01T10:00:00Z".to_string()),
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> VideoResource {
        self.resource
    }
}

/// Normalized summary fixture
pub fn summary(id: &str, video_type: VideoType, published_at: Timestamp, view_count: u64) -> VideoSummary {
    VideoSummary {
        id: id.to_string(),
        title: format!("Video {}", id),
        channel_title: "Test Channel".to_string(),
        thumbnail: None,
        link: VideoSummary::watch_url(id),
        published_at,
        view_count,
        duration_seconds: 600,
        video_type,
    }
}
