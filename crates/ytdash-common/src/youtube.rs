//! YouTube Data API v3 client with connection pooling and rate limiting
//!
//! This module provides a thin HTTP client over the handful of read-only
//! endpoints ytdash needs (`channels`, `playlistItems`, `search`, `videos`),
//! together with the wire models those endpoints return. The client does not
//! retry; retry policy belongs to the caller.

use crate::error::{Result, YtDashError};
use crate::types::ChannelInfo;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum number of ids the `videos` endpoint accepts per call
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Configuration for the YouTube API client
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Base URL of the API (e.g., "https://www.googleapis.com/youtube/v3")
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Page size for the uploads playlist listing (1..=50, default: 50)
    pub uploads_page_size: u32,
    /// Page size for live/upcoming searches (1..=50, default: 10)
    pub search_page_size: u32,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
            uploads_page_size: 50,
            search_page_size: 10,
        }
    }
}

impl YouTubeConfig {
    /// Create a new configuration with the default API root
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the discovery page sizes
    pub fn with_page_sizes(mut self, uploads: u32, search: u32) -> Self {
        self.uploads_page_size = uploads;
        self.search_page_size = search;
        self
    }
}

/// Live event filter for the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Live,
    Upcoming,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Live => "live",
            EventType::Upcoming => "upcoming",
        }
    }
}

/// YouTube Data API client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
    base_url: Url,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YouTubeClient {
    /// Create a new YouTube client with the given configuration
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| YtDashError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| YtDashError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        // A trailing slash makes `Url::join` append instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            config,
            base_url,
            rate_limiter,
        })
    }

    /// Create a new client with default configuration
    pub fn with_defaults(api_key: impl Into<String>) -> Result<Self> {
        Self::new(YouTubeConfig::new(api_key))
    }

    /// Build the URL of an API resource
    fn build_url(&self, resource: &str) -> Result<Url> {
        Ok(self.base_url.join(resource)?)
    }

    /// Make an authenticated GET request against an API resource
    #[instrument(skip(self, params))]
    async fn make_request(&self, resource: &str, params: &[(&str, &str)]) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.build_url(resource)?;
        debug!("Making request to: {}", url);

        let mut query_params: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        query_params.extend_from_slice(params);
        query_params.push(("key", self.config.api_key.as_str()));

        let response = self.client.get(url).query(&query_params).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {}", status);
            return Ok(response);
        }

        // The API explains failures (quota, bad key, bad id list) in a JSON body
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.describe())
            .unwrap_or_else(|_| format!("API returned status {}", status));

        if status.is_client_error() {
            warn!("Client error {}: {}", status, message);
        } else {
            warn!("Server error {}: {}", status, message);
        }

        Err(YtDashError::youtube_with_status(message, status.as_u16()))
    }

    /// Parse a JSON response into the specified type
    async fn parse_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let text = response
            .text()
            .await
            .map_err(|e| YtDashError::network_with_source("Failed to read response body", e))?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Make a request and parse the JSON response
    async fn request_json<T>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.make_request(resource, params).await?;
        self.parse_response(response).await
    }

    // ============================================================================
    // Public API Methods
    // ============================================================================

    /// Look up a channel by id with the requested resource parts.
    ///
    /// Returns `None` when the API knows no such channel.
    #[instrument(skip(self))]
    pub async fn get_channel(&self, channel_id: &str, parts: &str) -> Result<Option<ChannelResource>> {
        let response: ListResponse<ChannelResource> = self
            .request_json("channels", &[("part", parts), ("id", channel_id)])
            .await?;

        Ok(response.items.into_iter().next())
    }

    /// Resolve the id of the channel's uploads playlist
    #[instrument(skip(self))]
    pub async fn get_uploads_playlist_id(&self, channel_id: &str) -> Result<Option<String>> {
        let channel = self.get_channel(channel_id, "contentDetails").await?;
        Ok(channel.and_then(|c| c.uploads_playlist_id()))
    }

    /// List the video ids on the first page of a playlist
    #[instrument(skip(self))]
    pub async fn list_playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let max_results = self.config.uploads_page_size.to_string();
        let response: ListResponse<PlaylistItemResource> = self
            .request_json(
                "playlistItems",
                &[
                    ("part", "snippet"),
                    ("maxResults", max_results.as_str()),
                    ("playlistId", playlist_id),
                ],
            )
            .await?;

        let ids: Vec<String> = response
            .items
            .into_iter()
            .filter_map(|item| item.video_id())
            .collect();

        debug!("Playlist {} listed {} videos", playlist_id, ids.len());
        Ok(ids)
    }

    /// Search a channel's videos by live event type
    #[instrument(skip(self))]
    pub async fn search_event_video_ids(
        &self,
        channel_id: &str,
        event_type: EventType,
    ) -> Result<Vec<String>> {
        let max_results = self.config.search_page_size.to_string();
        let response: ListResponse<SearchResult> = self
            .request_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("maxResults", max_results.as_str()),
                    ("channelId", channel_id),
                    ("eventType", event_type.as_str()),
                    ("type", "video"),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// Fetch full details for a list of video ids.
    ///
    /// Ids are sent in batches of [`MAX_IDS_PER_REQUEST`]; batches are issued
    /// one after another and any failure fails the whole call.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>> {
        let mut videos = Vec::with_capacity(ids.len());

        for batch in ids.chunks(MAX_IDS_PER_REQUEST) {
            let joined = batch.join(",");
            let response: ListResponse<VideoResource> = self
                .request_json(
                    "videos",
                    &[
                        ("part", "snippet,contentDetails,statistics,liveStreamingDetails"),
                        ("id", joined.as_str()),
                    ],
                )
                .await?;
            videos.extend(response.items);
        }

        info!("Fetched details for {} of {} videos", videos.len(), ids.len());
        Ok(videos)
    }

    /// Fetch descriptive channel information
    #[instrument(skip(self))]
    pub async fn get_channel_info(&self, channel_id: &str) -> Result<Option<ChannelInfo>> {
        info!("Fetching channel information");
        let channel = self
            .get_channel(channel_id, "snippet,statistics,contentDetails,brandingSettings")
            .await?;

        Ok(channel.map(ChannelResource::into_info))
    }

    /// Get metrics about the client configuration and state
    pub fn get_client_metrics(&self) -> ClientMetrics {
        ClientMetrics {
            base_url: self.config.base_url.clone(),
            timeout_secs: self.config.timeout_secs,
            max_idle_per_host: self.config.max_idle_per_host,
            rate_limit_per_sec: self.config.rate_limit_per_sec,
            has_rate_limit_capacity: self.rate_limiter.check().is_ok(),
        }
    }
}

/// Client metrics for monitoring and debugging
#[derive(Debug, Clone, Serialize)]
pub struct ClientMetrics {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_idle_per_host: usize,
    pub rate_limit_per_sec: u32,
    pub has_rate_limit_capacity: bool,
}

// ============================================================================
// API Response Models
// ============================================================================

/// Envelope shared by every list endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    pub reason: Option<String>,
    pub domain: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Message plus the first machine-readable reason, e.g. "quota exceeded (quotaExceeded)"
    pub fn describe(&self) -> String {
        match self.errors.iter().find_map(|e| e.reason.as_deref()) {
            Some(reason) => format!("{} ({})", self.message, reason),
            None => self.message.clone(),
        }
    }
}

// ============================================================================
// Channel Models
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResource {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub content_details: Option<ChannelContentDetails>,
    pub statistics: Option<ChannelStatistics>,
    pub branding_settings: Option<BrandingSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

/// Counts arrive as decimal strings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub view_count: Option<String>,
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
    pub hidden_subscriber_count: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrandingSettings {
    pub channel: Option<BrandingChannel>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrandingChannel {
    pub keywords: Option<String>,
}

impl ChannelResource {
    pub fn uploads_playlist_id(&self) -> Option<String> {
        self.content_details
            .as_ref()
            .and_then(|d| d.related_playlists.as_ref())
            .and_then(|p| p.uploads.clone())
            .filter(|id| !id.is_empty())
    }

    /// Flatten the resource into the display model
    pub fn into_info(self) -> ChannelInfo {
        let uploads_playlist_id = self.uploads_playlist_id();
        let snippet = self.snippet;
        let statistics = self.statistics;
        let parse_count = |value: Option<&String>| value.and_then(|v| v.parse::<u64>().ok());

        ChannelInfo {
            id: self.id,
            title: snippet.as_ref().map(|s| s.title.clone()).unwrap_or_default(),
            description: snippet
                .as_ref()
                .map(|s| s.description.clone())
                .unwrap_or_default(),
            custom_url: snippet.as_ref().and_then(|s| s.custom_url.clone()),
            published_at: snippet
                .as_ref()
                .and_then(|s| s.published_at.as_deref())
                .and_then(|p| chrono::DateTime::parse_from_rfc3339(p).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            country: snippet.as_ref().and_then(|s| s.country.clone()),
            subscriber_count: parse_count(
                statistics.as_ref().and_then(|s| s.subscriber_count.as_ref()),
            ),
            video_count: parse_count(statistics.as_ref().and_then(|s| s.video_count.as_ref())),
            view_count: parse_count(statistics.as_ref().and_then(|s| s.view_count.as_ref())),
            keywords: self
                .branding_settings
                .and_then(|b| b.channel)
                .and_then(|c| c.keywords),
            uploads_playlist_id,
        }
    }
}

// ============================================================================
// Playlist and Search Models
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: Option<String>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

impl PlaylistItemResource {
    pub fn video_id(self) -> Option<String> {
        self.snippet
            .and_then(|s| s.resource_id)
            .and_then(|r| r.video_id)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: ResourceId,
}

// ============================================================================
// Video Models
// ============================================================================

/// A full `videos` record
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    pub content_details: Option<VideoContentDetails>,
    pub statistics: Option<VideoStatistics>,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: Option<String>,
    pub channel_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    pub thumbnails: Option<Thumbnails>,
    #[serde(default)]
    pub live_broadcast_content: LiveBroadcastContent,
}

/// Broadcast status flag of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveBroadcastContent {
    #[default]
    None,
    Live,
    Upcoming,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

/// Present on anything that was ever broadcast live
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub actual_start_time: Option<String>,
    pub actual_end_time: Option<String>,
    pub scheduled_start_time: Option<String>,
    pub concurrent_viewers: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Thumbnails {
    /// URL of the largest variant present
    pub fn best_url(&self) -> Option<&str> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.url.as_str())
        .find(|url| !url.is_empty())
    }
}
