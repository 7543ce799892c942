//! Date ranges and the day / week / month windows that produce them.
//!
//! Every window resolves to an inclusive range of Gregorian dates. Queries
//! against the session store use the timestamp bounds
//! `[start 00:00:00, end 23:59:59]`.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{JalaliDate, JalaliMonth};
use crate::error::Result;

/// First day of the week. Fixed, matching the Jalali week.
pub const WEEK_START: Weekday = Weekday::Sat;

/// Days since the most recent Saturday (Saturday = 0, Friday = 6).
#[must_use]
pub fn days_since_week_start(weekday: Weekday) -> u32 {
    (weekday.num_days_from_sunday() + 1) % 7
}

/// An inclusive range of Gregorian dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
    /// Human-readable name for this period (e.g., "Farvardin 1403")
    pub display_name: String,
}

impl DateRange {
    /// Create a new date range with the given bounds and display name.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate, display_name: impl Into<String>) -> Self {
        Self {
            start,
            end,
            display_name: display_name.into(),
        }
    }

    /// First instant of the range, `start 00:00:00`.
    #[must_use]
    pub fn start_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last instant of the range, `end 23:59:59`.
    #[must_use]
    pub fn end_bound(&self) -> NaiveDateTime {
        self.end
            .and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is always valid"))
    }

    /// Number of days covered.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Jalali form of the bounds, `YYYY/MM/DD to YYYY/MM/DD`.
    #[must_use]
    pub fn jalali_span(&self) -> String {
        format!(
            "{} to {}",
            JalaliDate::from_gregorian(self.start),
            JalaliDate::from_gregorian(self.end)
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// First day of the Saturday-first week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = days_since_week_start(date.weekday());
    date - Duration::days(i64::from(offset))
}

/// A time window sessions are aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// A single Gregorian day
    Day(NaiveDate),
    /// The Saturday-to-Friday week containing the date
    Week(NaiveDate),
    /// A Jalali month
    Month(JalaliMonth),
}

impl Window {
    /// Resolve the window to its Gregorian date range.
    ///
    /// Only month windows can fail, when the month is outside 1..=12.
    pub fn resolve(self) -> Result<DateRange> {
        match self {
            Self::Day(date) => {
                let jalali = JalaliDate::from_gregorian(date);
                Ok(DateRange::new(
                    date,
                    date,
                    format!("{jalali} ({})", date.format("%Y-%m-%d")),
                ))
            }
            Self::Week(date) => {
                let start = week_start(date);
                let end = start + Duration::days(6);
                let mut range = DateRange::new(start, end, "");
                range.display_name = format!("Week {}", range.jalali_span());
                Ok(range)
            }
            Self::Month(month) => month.date_range(),
        }
    }
}
