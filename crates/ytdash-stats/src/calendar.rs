//! Calendar grouping of summaries by local publish date

use chrono::{Datelike, Duration, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use ytdash_common::{Result, VideoSummary, YtDashError};

/// Group summaries by their publish date in `tz`, keeping input order within a day
pub fn group_by_day<'a, Tz: TimeZone>(
    summaries: &'a [VideoSummary],
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<&'a VideoSummary>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a VideoSummary>> = BTreeMap::new();

    for summary in summaries {
        let date = summary.published_at.with_timezone(tz).date_naive();
        days.entry(date).or_default().push(summary);
    }

    days
}

/// Monday-first weeks covering one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Each row runs Monday to Sunday; days outside the month are `None`
    pub weeks: Vec<[Option<NaiveDate>; 7]>,
}

impl MonthGrid {
    pub fn first_day(&self) -> NaiveDate {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .copied()
            .next()
            .unwrap_or(NaiveDate::MIN)
    }

    /// Dates of the month in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().flatten().flatten().copied()
    }
}

/// Build the calendar grid for a month
pub fn month_grid(year: i32, month: u32) -> Result<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        YtDashError::validation_field(format!("invalid month {}-{:02}", year, month), "month")
    })?;

    let mut weeks = Vec::with_capacity(6);
    let mut row: [Option<NaiveDate>; 7] = [None; 7];
    let mut date = first;

    while date.month() == month {
        let column = date.weekday().num_days_from_monday() as usize;
        row[column] = Some(date);
        if column == 6 {
            weeks.push(row);
            row = [None; 7];
        }
        date += Duration::days(1);
    }

    if row.iter().any(Option::is_some) {
        weeks.push(row);
    }

    Ok(MonthGrid { year, month, weeks })
}
