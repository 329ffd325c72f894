//! Calendar arithmetic: per-day segmentation of a rental and season bands.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// Billing granularity in milliseconds (15 minutes).
const QUARTER_HOUR_MILLIS: i64 = 15 * 60 * 1000;

/// The part of a rental that falls on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySegment {
    pub date: NaiveDate,
    /// Hours on this date, rounded up to the quarter hour.
    pub billable_hours: f64,
    pub is_weekend: bool,
}

/// Splits `[start, end)` into one segment per calendar date touched,
/// both endpoint dates included.
///
/// An end exactly at midnight still yields a (zero-hour) segment for that
/// date.
pub fn segment_days(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<DaySegment>, RateError> {
    if end <= start {
        return Err(RateError::InvalidRange { start, end });
    }

    let first = start.date();
    let last = end.date();
    let mut segments = Vec::with_capacity((last - first).num_days() as usize + 1);

    for date in first.iter_days().take_while(|date| *date <= last) {
        let day_start = date.and_time(chrono::NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);

        let from = if date == first { start } else { day_start };
        let to = if date == last { end } else { day_end };

        segments.push(DaySegment {
            date,
            billable_hours: billable_hours(to - from),
            is_weekend: is_weekend(date),
        });
    }

    Ok(segments)
}

/// Rounds a duration up to the quarter hour and expresses it in hours.
///
/// Any started millisecond counts, so a sub-second remainder still opens a
/// new quarter.
pub fn billable_hours(duration: Duration) -> f64 {
    let millis = elapsed_millis(duration);
    if millis <= 0 {
        return 0.0;
    }
    let quarters = (millis + QUARTER_HOUR_MILLIS - 1) / QUARTER_HOUR_MILLIS;
    quarters as f64 * 0.25
}

/// Whole milliseconds in `duration`, rounded up.
fn elapsed_millis(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds();
    if duration.subsec_nanos() % 1_000_000 > 0 {
        millis + 1
    } else {
        millis
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Seasonal band used by the long-distance rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Low,
    High,
}

impl Season {
    /// Classifies a date.
    ///
    /// High season runs June 15 through October 15; everything else is low.
    pub fn of(date: NaiveDate) -> Self {
        match (date.month(), date.day()) {
            (7..=9, _) => Season::High,
            (6, day) if day >= 15 => Season::High,
            (10, day) if day <= 15 => Season::High,
            _ => Season::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Low => "low season",
            Season::High => "high season",
        }
    }
}
