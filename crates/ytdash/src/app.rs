//! Command execution: fetch, derive and render

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{info, instrument, warn};
use ytdash_common::{VideoSummary, YouTubeClient, YtDashError};
use ytdash_config::Config;
use ytdash_stats::{
    group_by_day, month_grid, MonthGrid, StatisticsRollup, VideoAggregator, VideoSource,
};

use crate::cli::{CalendarArgs, Command, OutputFormat, SortKey, TableArgs};
use crate::render::{self, RenderContext};

/// Shown when the channel's items could not be fetched
pub const FETCH_FAILED: &str = "Failed to fetch videos. Check API key or quota.";

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Delays between attempts: roughly 0.5s, 1s, 2s ... capped at 10s
pub fn retry_strategy(max_retries: u32) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(max_retries as usize)
}

/// Run the aggregator, retrying transient failures up to `max_retries` times
pub async fn fetch_with_retry<S: VideoSource>(
    aggregator: &VideoAggregator<S>,
    channel_id: &str,
    max_retries: u32,
) -> Result<Vec<VideoSummary>> {
    RetryIf::spawn(
        retry_strategy(max_retries),
        || aggregator.fetch_and_aggregate(channel_id),
        |e: &YtDashError| {
            let transient = e.is_transient();
            if transient {
                warn!("Transient failure while fetching videos: {}", e);
            }
            transient
        },
    )
    .await
    .context(FETCH_FAILED)
}

/// Apply the table's type filter, sort order and row limit
pub fn select_rows<'a>(summaries: &'a [VideoSummary], args: &TableArgs) -> Vec<&'a VideoSummary> {
    let mut rows: Vec<&VideoSummary> = summaries
        .iter()
        .filter(|s| args.types.is_empty() || args.types.contains(&s.video_type))
        .collect();

    // Summaries arrive newest first; a stable sort keeps that order among equal views
    if args.sort == SortKey::Views {
        rows.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    }

    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    rows
}

#[derive(Serialize)]
struct CalendarView<'a> {
    #[serde(flatten)]
    grid: &'a MonthGrid,
    days: BTreeMap<NaiveDate, Vec<&'a VideoSummary>>,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    out.push('\n');
    Ok(out)
}

/// Calendar output for an already fetched channel
pub fn calendar_output(
    summaries: &[VideoSummary],
    args: &CalendarArgs,
    format: OutputFormat,
    ctx: &RenderContext,
) -> Result<String> {
    let (year, month) = match args.month {
        Some(ym) => (ym.year, ym.month),
        None => {
            let today = ctx.now.with_timezone(&ctx.tz);
            (today.year(), today.month())
        }
    };

    let grid = month_grid(year, month)?;
    let mut days = group_by_day(summaries, &ctx.tz);
    days.retain(|date, _| date.year() == year && date.month() == month);

    match format {
        OutputFormat::Text => Ok(render::render_calendar(&grid, &days, ctx)),
        OutputFormat::Json => to_json(&CalendarView { grid: &grid, days }),
    }
}

/// Table output for an already fetched channel
pub fn table_output(
    summaries: &[VideoSummary],
    args: &TableArgs,
    format: OutputFormat,
    ctx: &RenderContext,
) -> Result<String> {
    let rows = select_rows(summaries, args);
    match format {
        OutputFormat::Text => Ok(render::render_table(&rows, ctx)),
        OutputFormat::Json => to_json(&rows),
    }
}

/// Statistics output for an already fetched channel
pub fn stats_output(
    summaries: &[VideoSummary],
    format: OutputFormat,
    ctx: &RenderContext,
) -> Result<String> {
    let rollup = StatisticsRollup::compute(summaries, ctx.now.with_timezone(&ctx.tz));
    match format {
        OutputFormat::Text => Ok(render::render_stats(&rollup, ctx)),
        OutputFormat::Json => to_json(&rollup),
    }
}

/// Live dashboard bound to one channel
pub struct Dashboard {
    aggregator: VideoAggregator<YouTubeClient>,
    config: Config,
}

impl Dashboard {
    /// Check credentials and build the API client
    pub fn new(config: Config) -> Result<Self> {
        config.require_credentials()?;
        let client = YouTubeClient::new(config.youtube.client_config())?;

        Ok(Self {
            aggregator: VideoAggregator::new(client),
            config,
        })
    }

    fn context(&self, now: DateTime<Utc>) -> RenderContext {
        RenderContext {
            tz: self.config.display.tz(),
            date_format: self.config.display.date_format.clone(),
            now,
        }
    }

    async fn summaries(&self) -> Result<Vec<VideoSummary>> {
        fetch_with_retry(
            &self.aggregator,
            &self.config.youtube.channel_id,
            self.config.youtube.max_retries,
        )
        .await
    }

    /// Execute a command and return its rendered output
    #[instrument(skip(self))]
    pub async fn execute(&self, command: &Command, format: OutputFormat) -> Result<String> {
        let ctx = self.context(Utc::now());
        info!("Running {:?} for channel {}", command, self.config.youtube.channel_id);

        match command {
            Command::Table(args) => table_output(&self.summaries().await?, args, format, &ctx),
            Command::Calendar(args) => {
                calendar_output(&self.summaries().await?, args, format, &ctx)
            }
            Command::Stats => stats_output(&self.summaries().await?, format, &ctx),
            Command::Channel => {
                let info = self
                    .aggregator
                    .source()
                    .get_channel_info(&self.config.youtube.channel_id)
                    .await
                    .context("Failed to fetch channel information")?
                    .ok_or_else(|| {
                        YtDashError::missing_data(format!(
                            "channel {} not found",
                            self.config.youtube.channel_id
                        ))
                    })?;

                match format {
                    OutputFormat::Text => Ok(render::render_channel(&info, &ctx)),
                    OutputFormat::Json => to_json(&info),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::YearMonth;
    use ytdash_common::test_utils::{mock_timestamp, summary};
    use ytdash_common::VideoType;

    fn ctx() -> RenderContext {
        RenderContext {
            tz: chrono_tz::Asia::Bangkok,
            date_format: "%Y-%m-%d".to_string(),
            now: mock_timestamp(2024, 5, 15, 5, 0, 0),
        }
    }

    fn fixtures() -> Vec<VideoSummary> {
        vec![
            summary("a", VideoType::Short, mock_timestamp(2024, 5, 14, 3, 0, 0), 10),
            summary("b", VideoType::Video, mock_timestamp(2024, 5, 10, 3, 0, 0), 300),
            summary("c", VideoType::Video, mock_timestamp(2024, 5, 9, 3, 0, 0), 10),
            summary("d", VideoType::Stream, mock_timestamp(2024, 4, 30, 20, 0, 0), 50),
        ]
    }

    fn ids(rows: &[&VideoSummary]) -> Vec<String> {
        rows.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_select_rows_default_keeps_order() {
        let items = fixtures();
        let rows = select_rows(&items, &TableArgs::default());
        assert_eq!(ids(&rows), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_select_rows_filter_sort_limit() {
        let items = fixtures();

        let args = TableArgs {
            types: vec![VideoType::Video],
            ..Default::default()
        };
        assert_eq!(ids(&select_rows(&items, &args)), vec!["b", "c"]);

        let args = TableArgs {
            sort: SortKey::Views,
            limit: Some(3),
            ..Default::default()
        };
        // Equal views keep publish order
        assert_eq!(ids(&select_rows(&items, &args)), vec!["b", "d", "a"]);

        let args = TableArgs {
            types: vec![VideoType::Live],
            ..Default::default()
        };
        assert!(select_rows(&items, &args).is_empty());
    }

    #[test]
    fn test_calendar_defaults_to_current_local_month() {
        let items = fixtures();
        let out =
            calendar_output(&items, &CalendarArgs::default(), OutputFormat::Text, &ctx()).unwrap();

        assert!(out.starts_with("May 2024\n"));
        // 2024-04-30 20:00 UTC is May 1st in Bangkok
        assert!(out.contains("Wed 01 May"));
        assert!(out.contains("Tue 14 May"));
    }

    #[test]
    fn test_calendar_json_only_holds_requested_month() {
        let items = fixtures();
        let args = CalendarArgs {
            month: Some(YearMonth { year: 2024, month: 4 }),
        };
        let out = calendar_output(&items, &args, OutputFormat::Json, &ctx()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["year"], 2024);
        assert_eq!(json["month"], 4);
        assert!(json["days"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_table_json_lists_rows() {
        let items = fixtures();
        let args = TableArgs {
            limit: Some(1),
            ..Default::default()
        };
        let out = table_output(&items, &args, OutputFormat::Json, &ctx()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["type"], "Short");
    }

    #[test]
    fn test_stats_output_uses_display_zone() {
        let items = fixtures();
        let out = stats_output(&items, OutputFormat::Json, &ctx()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["totalVideos"], 4);
        // Item d falls on May 1st local time
        assert_eq!(json["monthlyVideos"], 4);
        assert_eq!(json["topVideo"]["id"], "b");
    }

    #[test]
    fn test_retry_strategy_is_bounded() {
        assert_eq!(retry_strategy(0).count(), 0);
        let delays: Vec<Duration> = retry_strategy(6).collect();
        assert_eq!(delays.len(), 6);
        assert!(delays.iter().all(|d| *d <= MAX_RETRY_DELAY));
    }

    #[test]
    fn test_dashboard_requires_credentials() {
        let err = Dashboard::new(Config::default()).err().unwrap();
        assert!(err.to_string().contains("api_key"));
    }
}
