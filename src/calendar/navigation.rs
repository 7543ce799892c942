//! Month-by-month calendar navigation with boundary clamping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{jalali_month_length, jalali_to_gregorian, month_name, JalaliDate};
use crate::date_range::DateRange;
use crate::error::{Error, Result};

/// How many years past the current one navigation may go.
pub const MAX_YEARS_AHEAD: i32 = 10;

/// A (year, month) pair in the Jalali calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliMonth {
    pub year: i32,
    pub month: u32,
}

/// Outcome of a navigation step.
///
/// A clamped step still carries a usable month, but callers have to look at
/// the variant to find out that the request was adjusted.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Moved to the requested month.
    Moved(JalaliMonth),
    /// The requested month was out of bounds; this is the nearest allowed one.
    Clamped(JalaliMonth),
}

impl Navigation {
    /// The month navigated to, clamped or not.
    pub const fn month(self) -> JalaliMonth {
        match self {
            Self::Moved(m) | Self::Clamped(m) => m,
        }
    }

    /// Whether the requested month had to be adjusted.
    #[must_use]
    pub const fn is_clamped(self) -> bool {
        matches!(self, Self::Clamped(_))
    }
}

impl JalaliMonth {
    /// Create a month, rejecting years below 1 and months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if year < 1 {
            return Err(Error::invalid_date(format!(
                "Jalali year must be at least 1, got {year}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_date(format!(
                "Jalali month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The current month in the local timezone.
    #[must_use]
    pub fn current() -> Self {
        JalaliDate::today().jalali_month()
    }

    /// Number of days in this month.
    #[must_use]
    pub fn length(self) -> u32 {
        jalali_month_length(self.year, self.month)
    }

    /// Inclusive Gregorian range covering this month.
    ///
    /// Fails with `InvalidDate` if the month is outside 1..=12.
    pub fn date_range(self) -> Result<DateRange> {
        let (sy, sm, sd) = jalali_to_gregorian(self.year, self.month, 1)?;
        let (ey, em, ed) = jalali_to_gregorian(self.year, self.month, self.length())?;
        let start = chrono::NaiveDate::from_ymd_opt(sy, sm, sd);
        let end = chrono::NaiveDate::from_ymd_opt(ey, em, ed);
        match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange::new(start, end, self.to_string())),
            _ => Err(Error::invalid_date(format!(
                "{self} is outside the supported range"
            ))),
        }
    }

    /// Step back one month. Going below year 1 clamps to 1/01.
    pub const fn previous(self) -> Navigation {
        let (year, month) = if self.month <= 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        if year < 1 {
            return Navigation::Clamped(Self { year: 1, month: 1 });
        }
        Navigation::Moved(Self { year, month })
    }

    /// Step forward one month. Going past `current_year + 10` clamps to
    /// Esfand of that year.
    pub const fn next(self, current_year: i32) -> Navigation {
        let (year, month) = if self.month >= 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let limit = current_year + MAX_YEARS_AHEAD;
        if year > limit {
            return Navigation::Clamped(Self {
                year: limit,
                month: 12,
            });
        }
        Navigation::Moved(Self { year, month })
    }

    /// Pull this month into the navigable range `1/01 ..= (current_year + 10)/12`.
    pub const fn bounded(self, current_year: i32) -> Navigation {
        let limit = current_year + MAX_YEARS_AHEAD;
        if self.year < 1 {
            Navigation::Clamped(Self { year: 1, month: 1 })
        } else if self.year > limit {
            Navigation::Clamped(Self {
                year: limit,
                month: 12,
            })
        } else {
            Navigation::Moved(self)
        }
    }

    /// Apply `steps` navigation steps (negative goes back), stopping at the
    /// first clamp.
    ///
    /// A month that already lies outside the navigable range is clamped
    /// before any step is taken.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn offset(self, steps: i32, current_year: i32) -> Navigation {
        let start = match self.bounded(current_year) {
            Navigation::Moved(month) => month,
            clamped @ Navigation::Clamped(_) => return clamped,
        };

        let limit = current_year + MAX_YEARS_AHEAD;
        let first = 12_i64;
        let last = i64::from(limit) * 12 + 11;
        let target = i64::from(start.year) * 12 + i64::from(start.month) - 1 + i64::from(steps);

        if target < first {
            Navigation::Clamped(Self { year: 1, month: 1 })
        } else if target > last {
            Navigation::Clamped(Self {
                year: limit,
                month: 12,
            })
        } else {
            Navigation::Moved(Self {
                year: (target / 12) as i32,
                month: (target % 12) as u32 + 1,
            })
        }
    }
}

impl fmt::Display for JalaliMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", month_name(self.month), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(year: i32, month: u32) -> JalaliMonth {
        JalaliMonth { year, month }
    }

    #[test]
    fn test_previous_wraps_year() {
        assert_eq!(month(1403, 1).previous(), Navigation::Moved(month(1402, 12)));
        assert_eq!(month(1403, 7).previous(), Navigation::Moved(month(1403, 6)));
    }

    #[test]
    fn test_previous_clamps_at_year_one() {
        let nav = month(1, 1).previous();
        assert!(nav.is_clamped());
        assert_eq!(nav.month(), month(1, 1));
        assert_eq!(month(1, 2).previous(), Navigation::Moved(month(1, 1)));
    }

    #[test]
    fn test_next_wraps_year() {
        assert_eq!(month(1402, 12).next(1403), Navigation::Moved(month(1403, 1)));
        assert_eq!(month(1403, 3).next(1403), Navigation::Moved(month(1403, 4)));
    }

    #[test]
    fn test_next_clamps_past_horizon() {
        assert_eq!(month(1413, 11).next(1403), Navigation::Moved(month(1413, 12)));
        let nav = month(1413, 12).next(1403);
        assert_eq!(nav, Navigation::Clamped(month(1413, 12)));
    }

    #[test]
    fn test_offset_stops_at_clamp() {
        assert_eq!(month(1403, 1).offset(-2, 1403), Navigation::Moved(month(1402, 11)));
        assert_eq!(month(1403, 1).offset(14, 1403), Navigation::Moved(month(1404, 3)));
        assert_eq!(month(1403, 1).offset(0, 1403), Navigation::Moved(month(1403, 1)));

        let nav = month(1, 3).offset(-5, 1403);
        assert_eq!(nav, Navigation::Clamped(month(1, 1)));

        let nav = month(1403, 1).offset(500, 1403);
        assert_eq!(nav, Navigation::Clamped(month(1413, 12)));
    }

    #[test]
    fn test_out_of_range_months_are_clamped() {
        assert_eq!(month(0, 1).bounded(1405), Navigation::Clamped(month(1, 1)));
        assert_eq!(month(-40, 6).offset(3, 1405), Navigation::Clamped(month(1, 1)));
        assert_eq!(month(1500, 1).bounded(1405), Navigation::Clamped(month(1415, 12)));
        assert_eq!(month(1500, 1).offset(0, 1405), Navigation::Clamped(month(1415, 12)));
        assert_eq!(month(1415, 12).bounded(1405), Navigation::Moved(month(1415, 12)));
        assert_eq!(month(1, 1).bounded(1405), Navigation::Moved(month(1, 1)));
    }

    #[test]
    fn test_offset_does_not_walk_every_step() {
        let nav = month(1403, 1).offset(i32::MAX, 1403);
        assert_eq!(nav, Navigation::Clamped(month(1413, 12)));
        let nav = month(1403, 1).offset(i32::MIN, 1403);
        assert_eq!(nav, Navigation::Clamped(month(1, 1)));
    }

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(JalaliMonth::new(0, 1).is_err());
        assert!(JalaliMonth::new(-3, 1).is_err());
        assert!(JalaliMonth::new(1403, 0).is_err());
        assert!(JalaliMonth::new(1403, 13).is_err());
        assert_eq!(JalaliMonth::new(1403, 12).unwrap(), month(1403, 12));
    }

    #[test]
    fn test_date_range() {
        let range = month(1403, 1).date_range().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 4, 19).unwrap());
        assert_eq!(range.display_name, "Farvardin 1403");

        let esfand = month(1402, 12).date_range().unwrap();
        assert_eq!(esfand.end, NaiveDate::from_ymd_opt(2024, 3, 19).unwrap());
        assert_eq!(esfand.num_days(), 29);
        assert_eq!(month(1403, 12).date_range().unwrap().num_days(), 30);
    }

    #[test]
    fn test_date_range_invalid_month() {
        assert!(matches!(
            month(1403, 13).date_range(),
            Err(Error::InvalidDate(_))
        ));
    }
}
