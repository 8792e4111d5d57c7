//! Common utilities and types for the ytdash YouTube channel dashboard

pub mod error;
pub mod logging;
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
pub mod types;
pub mod youtube;

// Re-export commonly used types
pub use error::{Result, YtDashError};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use types::*;
pub use youtube::{
    ChannelResource, ClientMetrics, EventType, ListResponse, LiveBroadcastContent,
    LiveStreamingDetails, Thumbnail, Thumbnails, VideoContentDetails, VideoResource,
    VideoSnippet, VideoStatistics, YouTubeClient, YouTubeConfig,
};
