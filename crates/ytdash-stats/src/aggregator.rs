//! Video aggregation pipeline: discovery, deduplication, classification and
//! normalization of a channel's items into [`VideoSummary`] values.

use crate::duration::parse_duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use ytdash_common::{
    EventType, LiveBroadcastContent, Result, VideoResource, VideoSummary, VideoType,
    YouTubeClient,
};

/// Longest duration, in seconds, still classified as a Short
pub const SHORT_MAX_SECONDS: u64 = 60;

/// Source of channel discovery lists and video details
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Id of the channel's uploads playlist, `None` if the channel has none
    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>>;

    /// Video ids listed in a playlist
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>>;

    /// Video ids of the channel's live or upcoming broadcasts
    async fn event_video_ids(&self, channel_id: &str, event_type: EventType)
        -> Result<Vec<String>>;

    /// Full records for the given ids
    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoResource>>;
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>> {
        self.get_uploads_playlist_id(channel_id).await
    }

    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        self.list_playlist_video_ids(playlist_id).await
    }

    async fn event_video_ids(
        &self,
        channel_id: &str,
        event_type: EventType,
    ) -> Result<Vec<String>> {
        self.search_event_video_ids(channel_id, event_type).await
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoResource>> {
        self.get_videos(ids).await
    }
}

/// Fetches a channel's items and turns them into summaries
#[derive(Debug)]
pub struct VideoAggregator<S> {
    source: S,
}

impl<S: VideoSource> VideoAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Access the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Discover, fetch and normalize every item of a channel.
    ///
    /// Any failed call fails the whole run; nothing is retried here.
    #[instrument(skip(self))]
    pub async fn fetch_and_aggregate(&self, channel_id: &str) -> Result<Vec<VideoSummary>> {
        let Some(playlist_id) = self.source.uploads_playlist_id(channel_id).await? else {
            info!("Channel {} has no uploads playlist", channel_id);
            return Ok(Vec::new());
        };

        let (uploads, live, upcoming) = tokio::try_join!(
            self.source.playlist_video_ids(&playlist_id),
            self.source.event_video_ids(channel_id, EventType::Live),
            self.source.event_video_ids(channel_id, EventType::Upcoming),
        )?;

        debug!(
            uploads = uploads.len(),
            live = live.len(),
            upcoming = upcoming.len(),
            "Discovery complete"
        );

        let ids = merge_ids([uploads, live, upcoming]);
        if ids.is_empty() {
            info!("No videos discovered for channel {}", channel_id);
            return Ok(Vec::new());
        }

        let records = self.source.videos(&ids).await?;
        let summaries = aggregate(records);

        info!("Aggregated {} videos from {} discovered ids", summaries.len(), ids.len());
        Ok(summaries)
    }
}

/// Union of id lists in first-seen order
pub fn merge_ids<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for id in lists.into_iter().flatten() {
        if !id.is_empty() && seen.insert(id.clone()) {
            merged.push(id);
        }
    }

    merged
}

/// Classify a record; the first matching rule wins
pub fn classify(record: &VideoResource, duration_seconds: u64) -> VideoType {
    let status = record
        .snippet
        .as_ref()
        .map(|s| s.live_broadcast_content)
        .unwrap_or_default();

    match status {
        LiveBroadcastContent::Live => VideoType::Live,
        LiveBroadcastContent::Upcoming => VideoType::Upcoming,
        _ if duration_seconds > 0 && duration_seconds <= SHORT_MAX_SECONDS => VideoType::Short,
        _ if record.live_streaming_details.is_some() => VideoType::Stream,
        _ => VideoType::Video,
    }
}

/// Normalize one record into a summary
pub fn summarize(record: VideoResource) -> VideoSummary {
    let duration_seconds = record
        .content_details
        .as_ref()
        .and_then(|d| d.duration.as_deref())
        .map(parse_duration)
        .unwrap_or(0);
    let video_type = classify(&record, duration_seconds);

    let view_count = record
        .statistics
        .as_ref()
        .and_then(|s| s.view_count.as_deref())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let snippet = record.snippet;
    let published_at = parse_published_at(
        &record.id,
        snippet.as_ref().and_then(|s| s.published_at.as_deref()),
    );
    let thumbnail = snippet
        .as_ref()
        .and_then(|s| s.thumbnails.as_ref())
        .and_then(|t| t.best_url())
        .map(str::to_string);
    let (title, channel_title) = snippet
        .map(|s| (s.title, s.channel_title))
        .unwrap_or_default();

    VideoSummary {
        link: VideoSummary::watch_url(&record.id),
        id: record.id,
        title,
        channel_title,
        thumbnail,
        published_at,
        view_count,
        duration_seconds,
        video_type,
    }
}

fn parse_published_at(id: &str, value: Option<&str>) -> DateTime<Utc> {
    match value.map(DateTime::parse_from_rfc3339) {
        Some(Ok(dt)) => dt.with_timezone(&Utc),
        Some(Err(e)) => {
            warn!("Video {} has unparsable publishedAt: {}", id, e);
            DateTime::<Utc>::UNIX_EPOCH
        }
        None => {
            warn!("Video {} has no publishedAt", id);
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

/// Deduplicate, normalize and order detail records.
///
/// The first record for an id wins. Output is newest first, ties broken by
/// id so identical input always gives identical output.
#[instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: Vec<VideoResource>) -> Vec<VideoSummary> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut summaries: Vec<VideoSummary> = records
        .into_iter()
        .filter(|record| {
            if record.id.is_empty() {
                warn!("Skipping video record without an id");
                return false;
            }
            seen.insert(record.id.clone())
        })
        .map(summarize)
        .collect();

    summaries.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!("Normalized {} unique videos", summaries.len());
    summaries
}
