//! Statistics rollup over aggregated summaries.
//!
//! Everything here is a pure function of the summaries and an explicit
//! `now`; the time zone carried by `now` decides where days, weeks and
//! months begin. Weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use ytdash_common::{VideoSummary, VideoType};

/// Days covered by the daily trend, today included
pub const DAILY_TREND_DAYS: usize = 30;

/// Weeks covered by the weekly trend, the current week included
pub const WEEKLY_TREND_WEEKS: usize = 4;

/// Count of one video type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub video_type: VideoType,
    pub count: usize,
}

/// Per-type counts for all five types, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeDistribution {
    counts: Vec<TypeCount>,
}

impl Default for TypeDistribution {
    fn default() -> Self {
        Self {
            counts: VideoType::ALL
                .iter()
                .map(|&video_type| TypeCount {
                    video_type,
                    count: 0,
                })
                .collect(),
        }
    }
}

impl TypeDistribution {
    pub fn record(&mut self, video_type: VideoType) {
        if let Some(entry) = self.counts.iter_mut().find(|c| c.video_type == video_type) {
            entry.count += 1;
        }
    }

    pub fn get(&self, video_type: VideoType) -> usize {
        self.counts
            .iter()
            .find(|c| c.video_type == video_type)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// All five entries, zeros included
    pub fn counts(&self) -> &[TypeCount] {
        &self.counts
    }

    /// Entries for a chart: zero counts left out
    pub fn chart_entries(&self) -> Vec<TypeCount> {
        self.counts.iter().filter(|c| c.count > 0).copied().collect()
    }
}

/// Views and uploads of one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Short axis label, "MM-DD"
    pub label: String,
    pub views: u64,
    pub videos: usize,
}

/// Views and uploads of one Monday-to-Sunday week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    /// "MMM DD - MMM DD"
    pub label: String,
    pub views: u64,
    pub videos: usize,
    pub type_counts: TypeDistribution,
    /// Titles per type, in input order; types without items are absent
    pub titles: BTreeMap<VideoType, Vec<String>>,
}

impl WeeklyBucket {
    fn new(start: NaiveDate) -> Self {
        let end = start + Duration::days(6);
        Self {
            start,
            end,
            label: format!("{} - {}", start.format("%b %d"), end.format("%b %d")),
            views: 0,
            videos: 0,
            type_counts: TypeDistribution::default(),
            titles: BTreeMap::new(),
        }
    }

    fn record(&mut self, summary: &VideoSummary) {
        self.views += summary.view_count;
        self.videos += 1;
        self.type_counts.record(summary.video_type);
        self.titles
            .entry(summary.video_type)
            .or_default()
            .push(summary.title.clone());
    }
}

/// Derived dashboard statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRollup {
    pub total_views: u64,
    pub total_videos: usize,
    pub monthly_views: u64,
    pub monthly_videos: usize,
    pub weekly_views: u64,
    pub weekly_videos: usize,
    pub type_distribution: TypeDistribution,
    pub daily_trend: Vec<DailyBucket>,
    pub weekly_trend: Vec<WeeklyBucket>,
    pub top_video: Option<VideoSummary>,
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

impl StatisticsRollup {
    /// Compute the rollup as of `now`.
    ///
    /// Monthly and weekly figures count items whose local date falls on or
    /// after the start of the period and whose instant is not after `now`.
    /// Trend buckets are keyed by local date only.
    #[instrument(skip(summaries, now), fields(summaries = summaries.len()))]
    pub fn compute<Tz: TimeZone>(summaries: &[VideoSummary], now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let month_start = today.with_day(1).unwrap_or(today);
        let current_week_start = week_start(today);

        let daily_start = today - Duration::days(DAILY_TREND_DAYS as i64 - 1);
        let mut daily_trend: Vec<DailyBucket> = (0..DAILY_TREND_DAYS as i64)
            .map(|offset| {
                let date = daily_start + Duration::days(offset);
                DailyBucket {
                    date,
                    label: date.format("%m-%d").to_string(),
                    views: 0,
                    videos: 0,
                }
            })
            .collect();

        let weekly_start = current_week_start - Duration::weeks(WEEKLY_TREND_WEEKS as i64 - 1);
        let mut weekly_trend: Vec<WeeklyBucket> = (0..WEEKLY_TREND_WEEKS as i64)
            .map(|offset| WeeklyBucket::new(weekly_start + Duration::weeks(offset)))
            .collect();

        let mut rollup = Self {
            total_views: 0,
            total_videos: summaries.len(),
            monthly_views: 0,
            monthly_videos: 0,
            weekly_views: 0,
            weekly_videos: 0,
            type_distribution: TypeDistribution::default(),
            daily_trend: Vec::new(),
            weekly_trend: Vec::new(),
            top_video: None,
        };
        let mut top: Option<&VideoSummary> = None;

        for summary in summaries {
            let views = summary.view_count;
            let local_date = summary.published_at.with_timezone(&tz).date_naive();
            let published = summary.published_at <= now_utc;

            rollup.total_views += views;
            rollup.type_distribution.record(summary.video_type);

            if top.map_or(true, |current| views > current.view_count) {
                top = Some(summary);
            }

            if published && local_date >= month_start {
                rollup.monthly_views += views;
                rollup.monthly_videos += 1;
            }

            if published && local_date >= current_week_start {
                rollup.weekly_views += views;
                rollup.weekly_videos += 1;
            }

            if let Some(bucket) = bucket_index(daily_start, local_date, 1, DAILY_TREND_DAYS)
                .and_then(|i| daily_trend.get_mut(i))
            {
                bucket.views += views;
                bucket.videos += 1;
            }

            if let Some(bucket) = bucket_index(weekly_start, local_date, 7, WEEKLY_TREND_WEEKS)
                .and_then(|i| weekly_trend.get_mut(i))
            {
                bucket.record(summary);
            }
        }

        rollup.daily_trend = daily_trend;
        rollup.weekly_trend = weekly_trend;
        rollup.top_video = top.cloned();

        debug!(
            total_views = rollup.total_views,
            monthly_videos = rollup.monthly_videos,
            weekly_videos = rollup.weekly_videos,
            "Computed statistics rollup"
        );
        rollup
    }
}

/// Index of the `width`-day bucket holding `date`, if within `count` buckets from `start`
fn bucket_index(start: NaiveDate, date: NaiveDate, width: i64, count: usize) -> Option<usize> {
    let days = (date - start).num_days();
    if days < 0 {
        return None;
    }
    let index = usize::try_from(days / width).ok()?;
    (index < count).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Bangkok;
    use chrono_tz::Tz;
    use ytdash_common::test_utils::{mock_timestamp, summary};

    /// Wednesday 2024-05-15 12:00 in Bangkok (UTC+7)
    fn now() -> DateTime<Tz> {
        Bangkok.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let rollup = StatisticsRollup::compute(&[], now());

        assert_eq!(rollup.total_views, 0);
        assert_eq!(rollup.total_videos, 0);
        assert_eq!(rollup.monthly_videos, 0);
        assert_eq!(rollup.weekly_videos, 0);
        assert_eq!(rollup.type_distribution.total(), 0);
        assert!(rollup.type_distribution.chart_entries().is_empty());
        assert!(rollup.top_video.is_none());

        assert_eq!(rollup.daily_trend.len(), DAILY_TREND_DAYS);
        assert!(rollup.daily_trend.iter().all(|b| b.views == 0 && b.videos == 0));
        assert_eq!(rollup.weekly_trend.len(), WEEKLY_TREND_WEEKS);
        assert!(rollup.weekly_trend.iter().all(|b| b.videos == 0 && b.titles.is_empty()));
    }

    #[test]
    fn test_period_windows() {
        let summaries = vec![
            // Monday 10:00 local: this week and month
            summary("mon", VideoType::Video, mock_timestamp(2024, 5, 13, 3, 0, 0), 100),
            // Sunday: this month, last week
            summary("sun", VideoType::Short, mock_timestamp(2024, 5, 12, 3, 0, 0), 20),
            // Last month
            summary("apr", VideoType::Video, mock_timestamp(2024, 4, 30, 3, 0, 0), 5),
            // Scheduled for tomorrow
            summary("soon", VideoType::Upcoming, mock_timestamp(2024, 5, 16, 3, 0, 0), 0),
        ];

        let rollup = StatisticsRollup::compute(&summaries, now());
        assert_eq!(rollup.total_views, 125);
        assert_eq!(rollup.total_videos, 4);
        assert_eq!(rollup.monthly_views, 120);
        assert_eq!(rollup.monthly_videos, 2);
        assert_eq!(rollup.weekly_views, 100);
        assert_eq!(rollup.weekly_videos, 1);
    }

    #[test]
    fn test_local_day_boundaries_follow_now_zone() {
        // 2024-04-30 18:00 UTC is already May 1st in Bangkok
        let summaries = vec![summary("edge", VideoType::Video, mock_timestamp(2024, 4, 30, 18, 0, 0), 7)];

        let bangkok = StatisticsRollup::compute(&summaries, now());
        assert_eq!(bangkok.monthly_videos, 1);

        let utc_now = now().with_timezone(&Utc);
        let utc = StatisticsRollup::compute(&summaries, utc_now);
        assert_eq!(utc.monthly_videos, 0);
    }

    #[test]
    fn test_daily_trend_buckets() {
        let summaries = vec![
            summary("a", VideoType::Video, mock_timestamp(2024, 5, 15, 1, 0, 0), 10),
            summary("b", VideoType::Short, mock_timestamp(2024, 5, 15, 2, 0, 0), 5),
            summary("c", VideoType::Video, mock_timestamp(2024, 4, 16, 1, 0, 0), 3),
            // One day before the window
            summary("d", VideoType::Video, mock_timestamp(2024, 4, 15, 1, 0, 0), 1),
        ];

        let rollup = StatisticsRollup::compute(&summaries, now());
        let first = &rollup.daily_trend[0];
        let last = &rollup.daily_trend[DAILY_TREND_DAYS - 1];

        assert_eq!(first.date, date(2024, 4, 16));
        assert_eq!(first.label, "04-16");
        assert_eq!((first.views, first.videos), (3, 1));
        assert_eq!(last.date, date(2024, 5, 15));
        assert_eq!((last.views, last.videos), (15, 2));

        let in_window: u64 = rollup.daily_trend.iter().map(|b| b.views).sum();
        assert_eq!(in_window, 18);
    }

    #[test]
    fn test_weekly_trend_buckets() {
        let summaries = vec![
            summary("cur-video", VideoType::Video, mock_timestamp(2024, 5, 14, 3, 0, 0), 10),
            summary("cur-short", VideoType::Short, mock_timestamp(2024, 5, 13, 3, 0, 0), 4),
            summary("cur-soon", VideoType::Upcoming, mock_timestamp(2024, 5, 18, 3, 0, 0), 0),
            summary("old-stream", VideoType::Stream, mock_timestamp(2024, 4, 22, 3, 0, 0), 9),
            summary("too-old", VideoType::Video, mock_timestamp(2024, 4, 21, 3, 0, 0), 1),
        ];

        let rollup = StatisticsRollup::compute(&summaries, now());
        let weeks = &rollup.weekly_trend;

        let starts: Vec<NaiveDate> = weeks.iter().map(|w| w.start).collect();
        assert_eq!(
            starts,
            vec![date(2024, 4, 22), date(2024, 4, 29), date(2024, 5, 6), date(2024, 5, 13)]
        );
        assert_eq!(weeks[0].end, date(2024, 4, 28));
        assert_eq!(weeks[0].label, "Apr 22 - Apr 28");

        assert_eq!((weeks[0].views, weeks[0].videos), (9, 1));
        assert_eq!(weeks[0].type_counts.get(VideoType::Stream), 1);

        let current = &weeks[3];
        assert_eq!((current.views, current.videos), (14, 3));
        assert_eq!(current.type_counts.get(VideoType::Video), 1);
        assert_eq!(current.type_counts.get(VideoType::Short), 1);
        assert_eq!(current.type_counts.get(VideoType::Upcoming), 1);
        assert_eq!(current.titles[&VideoType::Video], vec!["Video cur-video"]);
        assert!(!current.titles.contains_key(&VideoType::Live));
    }

    #[test]
    fn test_type_distribution() {
        let at = mock_timestamp(2024, 5, 1, 0, 0, 0);
        let summaries = vec![
            summary("a", VideoType::Video, at, 1),
            summary("b", VideoType::Video, at, 1),
            summary("c", VideoType::Live, at, 1),
        ];

        let rollup = StatisticsRollup::compute(&summaries, now());
        let distribution = &rollup.type_distribution;
        assert_eq!(distribution.counts().len(), 5);
        assert_eq!(distribution.get(VideoType::Video), 2);
        assert_eq!(distribution.get(VideoType::Short), 0);

        let chart = distribution.chart_entries();
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].video_type, VideoType::Video);
        assert_eq!(chart[1].video_type, VideoType::Live);
    }

    #[test]
    fn test_top_video_ties_go_to_first() {
        let at = mock_timestamp(2024, 5, 1, 0, 0, 0);
        let summaries = vec![
            summary("a", VideoType::Video, at, 50),
            summary("b", VideoType::Video, at, 90),
            summary("c", VideoType::Video, at, 90),
        ];

        let rollup = StatisticsRollup::compute(&summaries, now());
        assert_eq!(rollup.top_video.map(|v| v.id), Some("b".to_string()));

        let zeros = vec![summary("x", VideoType::Video, at, 0), summary("y", VideoType::Video, at, 0)];
        let rollup = StatisticsRollup::compute(&zeros, now());
        assert_eq!(rollup.top_video.map(|v| v.id), Some("x".to_string()));
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(date(2024, 5, 15)), date(2024, 5, 13));
        assert_eq!(week_start(date(2024, 5, 13)), date(2024, 5, 13));
        assert_eq!(week_start(date(2024, 5, 19)), date(2024, 5, 13));
    }

    #[test]
    fn test_rollup_serializes_camel_case() {
        let summaries = vec![summary("a", VideoType::Short, mock_timestamp(2024, 5, 14, 3, 0, 0), 3)];
        let rollup = StatisticsRollup::compute(&summaries, now());

        let json = serde_json::to_value(&rollup).unwrap();
        assert_eq!(json["totalViews"], 3);
        assert_eq!(json["typeDistribution"][1]["type"], "Short");
        assert_eq!(json["weeklyTrend"][3]["titles"]["Short"][0], "Video a");
        assert_eq!(json["dailyTrend"].as_array().unwrap().len(), DAILY_TREND_DAYS);
    }
}
