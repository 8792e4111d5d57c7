//! Text rendering of tables, calendars, statistics and channel information.
//!
//! Renderers return strings so they stay testable; the caller decides where
//! output goes. Times are shown in the configured display zone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use ytdash_common::{ChannelInfo, VideoSummary, VideoType};
use ytdash_stats::{MonthGrid, StatisticsRollup};

pub const NO_VIDEOS_MESSAGE: &str = "No videos found.";

const TITLE_WIDTH: usize = 48;
const CHANNEL_WIDTH: usize = 24;

/// Columns of the table that hold numbers
const RIGHT_ALIGNED: [usize; 2] = [3, 4];

/// Display settings shared by the renderers
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub tz: Tz,
    pub date_format: String,
    pub now: DateTime<Utc>,
}

impl RenderContext {
    fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format(&self.date_format).to_string()
    }
}

/// Newline-terminated text buffer
#[derive(Default)]
struct Output(String);

impl Output {
    fn line(&mut self, text: impl AsRef<str>) {
        self.0.push_str(text.as_ref());
        self.0.push('\n');
    }

    fn blank(&mut self) {
        self.0.push('\n');
    }

    fn finish(self) -> String {
        self.0
    }
}

/// `m:ss` or `h:mm:ss`; empty for zero
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return String::new();
    }

    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Duration column text: `LIVE` for live items
pub fn duration_cell(summary: &VideoSummary) -> String {
    match summary.video_type {
        VideoType::Live => "LIVE".to_string(),
        _ => format_duration(summary.duration_seconds),
    }
}

/// Thousands-separated count, e.g. `1,234,567`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Human relative time such as "3 days ago" or "in 2 hours"
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(at);
    let future = delta.num_seconds() < 0;
    let seconds = delta.num_seconds().unsigned_abs();

    let minutes = (seconds as f64 / 60.0).round() as u64;
    let hours = (seconds as f64 / 3600.0).round() as u64;
    let days = (seconds as f64 / 86_400.0).round() as u64;

    let phrase = match seconds {
        0..=44 => "a few seconds".to_string(),
        45..=89 => "a minute".to_string(),
        _ if seconds < 45 * 60 => format!("{} minutes", minutes),
        _ if seconds < 90 * 60 => "an hour".to_string(),
        _ if seconds < 22 * 3600 => format!("{} hours", hours),
        _ if seconds < 36 * 3600 => "a day".to_string(),
        _ if days < 26 => format!("{} days", days),
        _ if days < 46 => "a month".to_string(),
        _ if days < 320 => format!("{} months", (days as f64 / 30.4).round() as u64),
        _ if days < 548 => "a year".to_string(),
        _ => format!("{} years", (days as f64 / 365.0).round() as u64),
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn type_tag(video_type: VideoType) -> String {
    format!("[{}]", video_type)
}

/// One row per video
pub fn render_table(rows: &[&VideoSummary], ctx: &RenderContext) -> String {
    if rows.is_empty() {
        return format!("{}\n", NO_VIDEOS_MESSAGE);
    }

    let headers = ["TYPE", "TITLE", "CHANNEL", "VIEWS", "LENGTH", "PUBLISHED", "AGE"];
    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|summary| {
            [
                summary.video_type.as_str().to_uppercase(),
                truncate(&summary.title, TITLE_WIDTH),
                truncate(&summary.channel_title, CHANNEL_WIDTH),
                format_count(summary.view_count),
                duration_cell(summary),
                ctx.format_date(summary.published_at),
                relative_age(summary.published_at, ctx.now),
            ]
        })
        .collect();

    let mut widths: [usize; 7] = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (value, width))| {
                if RIGHT_ALIGNED.contains(&i) {
                    format!("{:>width$}", value, width = width)
                } else {
                    pad(value, width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Output::default();
    out.line(format_row(headers.to_vec()));
    for row in &cells {
        out.line(format_row(row.iter().map(String::as_str).collect()));
    }
    out.blank();
    out.line(format!("{} videos", rows.len()));
    out.finish()
}

/// Month grid followed by the uploads of each day
pub fn render_calendar(
    grid: &MonthGrid,
    days: &BTreeMap<NaiveDate, Vec<&VideoSummary>>,
    ctx: &RenderContext,
) -> String {
    let mut out = Output::default();
    out.line(grid.first_day().format("%B %Y").to_string());
    out.line(" Mo  Tu  We  Th  Fr  Sa  Su");

    for week in &grid.weeks {
        let row: Vec<String> = week
            .iter()
            .map(|day| match day {
                Some(date) => {
                    let marker = if days.contains_key(date) { '*' } else { ' ' };
                    format!("{:>3}{}", date.day(), marker)
                }
                None => "    ".to_string(),
            })
            .collect();
        out.line(row.concat().trim_end());
    }

    let mut any = false;
    for date in grid.days() {
        let Some(items) = days.get(&date) else {
            continue;
        };
        any = true;
        out.blank();
        out.line(date.format("%a %d %b").to_string());
        for item in items {
            let time = item.published_at.with_timezone(&ctx.tz).format("%H:%M");
            out.line(format!("  {}  {:<9} {}", time, type_tag(item.video_type), item.title));
        }
    }

    if !any {
        out.blank();
        out.line(NO_VIDEOS_MESSAGE);
    }
    out.finish()
}

fn stat_card(label: &str, views: u64, videos: usize, noun: &str) -> String {
    format!("{:<15}{:>12}  ({} {})", label, format_count(views), videos, noun)
}

/// Summary cards, distribution, trends and top video
pub fn render_stats(rollup: &StatisticsRollup, ctx: &RenderContext) -> String {
    let mut out = Output::default();

    out.line(stat_card("Total views", rollup.total_views, rollup.total_videos, "videos"));
    out.line(stat_card("This month", rollup.monthly_views, rollup.monthly_videos, "new videos"));
    out.line(stat_card("This week", rollup.weekly_views, rollup.weekly_videos, "new videos"));

    out.blank();
    out.line("Content types");
    let entries = rollup.type_distribution.chart_entries();
    if entries.is_empty() {
        out.line("  (none)");
    }
    let total = rollup.type_distribution.total().max(1);
    for entry in entries {
        let share = entry.count as f64 * 100.0 / total as f64;
        out.line(format!(
            "  {:<9} {:>5}  {:>5.1}%",
            entry.video_type.as_str(),
            entry.count,
            share
        ));
    }

    out.blank();
    out.line("Weekly trend");
    for week in &rollup.weekly_trend {
        out.line(format!(
            "  {:<17} {:>12} views  {:>3} videos",
            week.label,
            format_count(week.views),
            week.videos
        ));
        for (video_type, titles) in &week.titles {
            for title in titles {
                out.line(format!(
                    "      {:<9} {}",
                    type_tag(*video_type),
                    truncate(title, TITLE_WIDTH)
                ));
            }
        }
    }

    out.blank();
    out.line("Daily trend (last 30 days)");
    let peak = rollup.daily_trend.iter().map(|b| b.views).max().unwrap_or(0);
    for bucket in &rollup.daily_trend {
        let bar_len = if peak == 0 {
            0
        } else {
            ((bucket.views as f64 / peak as f64) * 30.0).round() as usize
        };
        out.line(format!(
            "  {}  {:>12}  {}",
            bucket.label,
            format_count(bucket.views),
            "#".repeat(bar_len)
        ));
    }

    out.blank();
    out.line("Top video");
    match &rollup.top_video {
        Some(top) => {
            out.line(format!("  {}", top.title));
            out.line(format!(
                "  {} views, {} ({})",
                format_count(top.view_count),
                ctx.format_date(top.published_at),
                top.video_type
            ));
            out.line(format!("  {}", top.link));
        }
        None => out.line(format!("  {}", NO_VIDEOS_MESSAGE)),
    }

    out.finish()
}

/// Channel details
pub fn render_channel(info: &ChannelInfo, ctx: &RenderContext) -> String {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let count = |value: Option<u64>| optional(value.map(format_count));
    let created = info.published_at.map(|at| ctx.format_date(at));

    let fields = [
        ("Title", info.title.clone()),
        ("Id", info.id.clone()),
        ("Custom URL", optional(info.custom_url.clone())),
        ("Created", optional(created)),
        ("Country", optional(info.country.clone())),
        ("Subscribers", count(info.subscriber_count)),
        ("Videos", count(info.video_count)),
        ("Views", count(info.view_count)),
        ("Keywords", optional(info.keywords.clone())),
        ("Uploads playlist", optional(info.uploads_playlist_id.clone())),
    ];

    let mut out = Output::default();
    for (label, value) in fields {
        out.line(format!("{:<18}{}", label, value));
    }
    if !info.description.is_empty() {
        out.blank();
        out.line(&info.description);
    }
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytdash_common::test_utils::{mock_timestamp, summary};
    use ytdash_stats::month_grid;

    fn ctx() -> RenderContext {
        RenderContext {
            tz: chrono_tz::Asia::Bangkok,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            now: mock_timestamp(2024, 5, 15, 5, 0, 0),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3723), "1:02:03");
        assert_eq!(format_duration(36_000), "10:00:00");
    }

    #[test]
    fn test_duration_cell_marks_live() {
        let mut item = summary("a", VideoType::Live, mock_timestamp(2024, 5, 1, 0, 0, 0), 0);
        item.duration_seconds = 0;
        assert_eq!(duration_cell(&item), "LIVE");

        item.video_type = VideoType::Video;
        item.duration_seconds = 65;
        assert_eq!(duration_cell(&item), "1:05");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_relative_age() {
        let now = mock_timestamp(2024, 5, 15, 12, 0, 0);
        assert_eq!(relative_age(mock_timestamp(2024, 5, 15, 11, 59, 50), now), "a few seconds ago");
        assert_eq!(relative_age(mock_timestamp(2024, 5, 15, 11, 50, 0), now), "10 minutes ago");
        assert_eq!(relative_age(mock_timestamp(2024, 5, 15, 9, 0, 0), now), "3 hours ago");
        assert_eq!(relative_age(mock_timestamp(2024, 5, 14, 12, 0, 0), now), "a day ago");
        assert_eq!(relative_age(mock_timestamp(2024, 5, 12, 12, 0, 0), now), "3 days ago");
        assert_eq!(relative_age(mock_timestamp(2024, 2, 15, 12, 0, 0), now), "3 months ago");
        assert_eq!(relative_age(mock_timestamp(2021, 5, 15, 12, 0, 0), now), "3 years ago");
        assert_eq!(relative_age(mock_timestamp(2024, 5, 17, 12, 0, 0), now), "in 2 days");
    }

    #[test]
    fn test_render_table() {
        let mut live = summary("live", VideoType::Live, mock_timestamp(2024, 5, 15, 4, 0, 0), 1200);
        live.title = "Live now".to_string();
        live.channel_title = "Night Owl Streams".to_string();
        let mut video = summary("vid", VideoType::Video, mock_timestamp(2024, 5, 12, 5, 0, 0), 3);
        video.channel_title = "A channel name far longer than the column allows".to_string();

        let out = render_table(&[&live, &video], &ctx());
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("TYPE"));
        assert!(lines[0].contains("CHANNEL"));
        assert!(lines[1].starts_with("LIVE"));
        assert!(lines[1].contains("Live now"));
        assert!(lines[1].contains("Night Owl Streams"));
        assert!(lines[2].contains("A channel name far lo..."));
        assert!(lines[1].contains("1,200"));
        assert!(lines[1].contains("2024-05-15 11:00"));
        assert!(lines[1].contains("an hour ago"));
        assert!(lines[2].contains("10:00"));
        assert!(out.ends_with("2 videos\n"));
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&[], &ctx()), "No videos found.\n");
    }

    #[test]
    fn test_render_calendar() {
        let items = vec![
            summary("a", VideoType::Short, mock_timestamp(2024, 5, 14, 3, 0, 0), 0),
            summary("b", VideoType::Video, mock_timestamp(2024, 5, 2, 1, 30, 0), 0),
        ];
        let days = ytdash_stats::group_by_day(&items, &chrono_tz::Asia::Bangkok);
        let grid = month_grid(2024, 5).unwrap();

        let out = render_calendar(&grid, &days, &ctx());
        assert!(out.starts_with("May 2024\n"));
        assert!(out.contains(" 14*"));
        assert!(out.contains("  2*"));
        assert!(out.contains("Tue 14 May"));
        assert!(out.contains("10:00  [Short]   Video a"));
        assert!(out.contains("08:30  [Video]   Video b"));
        // Thursday the 2nd is listed before Tuesday the 14th
        assert!(out.find("Thu 02 May").unwrap() < out.find("Tue 14 May").unwrap());
    }

    #[test]
    fn test_render_calendar_without_uploads() {
        let grid = month_grid(2024, 6).unwrap();
        let out = render_calendar(&grid, &BTreeMap::new(), &ctx());
        assert!(out.starts_with("June 2024\n"));
        assert!(out.trim_end().ends_with(NO_VIDEOS_MESSAGE));
    }

    #[test]
    fn test_render_stats() {
        let items = vec![
            summary("a", VideoType::Short, mock_timestamp(2024, 5, 14, 3, 0, 0), 1500),
            summary("b", VideoType::Video, mock_timestamp(2024, 5, 2, 1, 30, 0), 20),
        ];
        let now = mock_timestamp(2024, 5, 15, 5, 0, 0).with_timezone(&chrono_tz::Asia::Bangkok);
        let rollup = StatisticsRollup::compute(&items, now);

        let out = render_stats(&rollup, &ctx());
        assert!(out.contains("Total views           1,520  (2 videos)"));
        assert!(out.contains("Short         1   50.0%"));
        assert!(out.contains("May 13 - May 19"));
        assert!(out.contains("[Short]   Video a"));
        assert!(out.contains("Top video\n  Video a\n  1,500 views"));
    }

    #[test]
    fn test_render_stats_empty() {
        let now = mock_timestamp(2024, 5, 15, 5, 0, 0).with_timezone(&chrono_tz::Asia::Bangkok);
        let rollup = StatisticsRollup::compute(&[], now);

        let out = render_stats(&rollup, &ctx());
        assert!(out.contains("(none)"));
        assert!(out.trim_end().ends_with(NO_VIDEOS_MESSAGE));
    }

    #[test]
    fn test_render_channel() {
        let info = ChannelInfo {
            id: "UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string(),
            title: "Channel".to_string(),
            description: "About us".to_string(),
            custom_url: Some("@channel".to_string()),
            published_at: Some(mock_timestamp(2015, 3, 2, 8, 30, 0)),
            country: None,
            subscriber_count: Some(12_345),
            video_count: Some(7),
            view_count: None,
            keywords: None,
            uploads_playlist_id: Some("UU_x5XG1OV2P6uZZ5FSM9Ttw".to_string()),
        };

        let out = render_channel(&info, &ctx());
        assert!(out.contains("Custom URL        @channel"));
        assert!(out.contains("Created           2015-03-02 15:30"));
        assert!(out.contains("Country           -"));
        assert!(out.contains("Subscribers       12,345"));
        assert!(out.ends_with("About us\n"));
    }
}
