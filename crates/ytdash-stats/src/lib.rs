//! Video aggregation and statistics for the ytdash YouTube channel dashboard

pub mod aggregator;
pub mod calendar;
pub mod duration;
pub mod rollup;

pub use aggregator::{aggregate, classify, merge_ids, summarize, VideoAggregator, VideoSource};
pub use calendar::{group_by_day, month_grid, MonthGrid};
pub use duration::parse_duration;
pub use rollup::{DailyBucket, StatisticsRollup, TypeCount, TypeDistribution, WeeklyBucket};
