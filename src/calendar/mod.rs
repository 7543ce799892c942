//! Gregorian ↔ Jalali calendar conversion.
//!
//! Both directions use the day-count method: a date is turned into a day
//! offset from a fixed epoch, and the offset is decomposed back into the other
//! calendar's year, month and day by dividing through its cycle lengths
//! (400/100/4/1 years for Gregorian, 33/4/1 years for Jalali). No per-day
//! iteration, constant time.
//!
//! Leap years follow the arithmetic 33-year cycle, which agrees with the
//! official calendar well beyond the years this application deals with.

pub mod navigation;

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use navigation::{JalaliMonth, Navigation};

/// Residues of `year mod 33` that are leap years.
const LEAP_RESIDUES: [i32; 8] = [1, 5, 9, 13, 17, 22, 26, 30];

/// Cumulative day counts before each Gregorian month in a common year.
const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days in a Jalali 33-year cycle.
const JALALI_CYCLE_DAYS: i64 = 12_053;

/// Days in the first six (31-day) Jalali months.
const FIRST_HALF_DAYS: i64 = 186;

const MONTH_NAMES: [&str; 12] = [
    "Farvardin",
    "Ordibehesht",
    "Khordad",
    "Tir",
    "Mordad",
    "Shahrivar",
    "Mehr",
    "Aban",
    "Azar",
    "Dey",
    "Bahman",
    "Esfand",
];

/// A date in the Jalali calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Create a date, checking month and day against the month length.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if year < 1 {
            return Err(Error::invalid_date(format!(
                "Jalali year must be at least 1, got {year}"
            )));
        }
        check_month(month)?;
        let length = jalali_month_length(year, month);
        if day == 0 || day > length {
            return Err(Error::invalid_date(format!(
                "day {day} is outside 1..={length} for {year}/{month:02}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Convert a Gregorian date.
    #[must_use]
    pub fn from_gregorian(date: NaiveDate) -> Self {
        gregorian_to_jalali(date.year(), date.month(), date.day())
    }

    /// Convert to a Gregorian date.
    pub fn to_gregorian(&self) -> Result<NaiveDate> {
        let (gy, gm, gd) = jalali_to_gregorian(self.year, self.month, self.day)?;
        NaiveDate::from_ymd_opt(gy, gm, gd).ok_or_else(|| {
            Error::invalid_date(format!("{self} has no Gregorian counterpart"))
        })
    }

    /// Today's date in the local timezone.
    #[must_use]
    pub fn today() -> Self {
        Self::from_gregorian(Local::now().date_naive())
    }

    /// The month this date belongs to.
    #[must_use]
    pub const fn jalali_month(&self) -> JalaliMonth {
        JalaliMonth {
            year: self.year,
            month: self.month,
        }
    }

    /// Parse `YYYY/MM/DD`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(Error::invalid_date(format!(
                "expected YYYY/MM/DD, got '{s}'"
            )));
        };
        let bad = |_| Error::invalid_date(format!("expected YYYY/MM/DD, got '{s}'"));
        Self::new(
            year.parse().map_err(bad)?,
            month.parse().map_err(bad)?,
            day.parse().map_err(bad)?,
        )
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Convert a Gregorian date to Jalali.
///
/// The input must be a real calendar date; anything else gives an unspecified
/// (but non-panicking) result.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> JalaliDate {
    let gy = i64::from(gy);
    let month_index = (gm.clamp(1, 12) - 1) as usize;
    let gy2 = if gm > 2 { gy + 1 } else { gy };

    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100
        + (gy2 + 399) / 400
        + i64::from(gd)
        + GREGORIAN_DAYS_BEFORE_MONTH[month_index];

    let mut jy = -1595 + 33 * (days / JALALI_CYCLE_DAYS);
    days %= JALALI_CYCLE_DAYS;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < FIRST_HALF_DAYS {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - FIRST_HALF_DAYS) / 30, 1 + (days - FIRST_HALF_DAYS) % 30)
    };

    JalaliDate {
        year: jy as i32,
        month: jm as u32,
        day: jd as u32,
    }
}

/// Convert a Jalali date to a Gregorian `(year, month, day)` triple.
///
/// Fails only when `jm` is outside 1..=12. The day is not checked against
/// the month length: an overflowing day rolls into the following month.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn jalali_to_gregorian(jy: i32, jm: u32, jd: u32) -> Result<(i32, u32, u32)> {
    check_month(jm)?;

    let jy = i64::from(jy) + 1595;
    let jm = i64::from(jm);
    let month_days = if jm < 7 {
        (jm - 1) * 31
    } else {
        (jm - 7) * 30 + FIRST_HALF_DAYS
    };
    let mut days =
        -355_668 + 365 * jy + (jy / 33) * 8 + ((jy % 33) + 3) / 4 + i64::from(jd) + month_days;

    let mut gy = 400 * (days / 146_097);
    days %= 146_097;
    if days > 36_524 {
        days -= 1;
        gy += 100 * (days / 36_524);
        days %= 36_524;
        if days >= 365 {
            days += 1;
        }
    }
    gy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        gy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let mut gd = days + 1;
    let february = if is_gregorian_leap(gy) { 29 } else { 28 };
    let month_lengths = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut gm = 1;
    for length in month_lengths {
        if gd <= length {
            break;
        }
        gd -= length;
        gm += 1;
    }

    Ok((gy as i32, gm as u32, gd as u32))
}

/// Whether a Jalali year has a 30-day Esfand.
#[must_use]
pub fn is_jalali_leap(jy: i32) -> bool {
    LEAP_RESIDUES.contains(&jy.rem_euclid(33))
}

/// Number of days in a Jalali month.
///
/// Months outside 1..=12 report 0.
#[must_use]
pub fn jalali_month_length(jy: i32, jm: u32) -> u32 {
    match jm {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_jalali_leap(jy) => 30,
        12 => 29,
        _ => 0,
    }
}

/// Latin transliteration of a Jalali month name.
#[must_use]
pub fn month_name(jm: u32) -> &'static str {
    match jm {
        1..=12 => MONTH_NAMES[(jm - 1) as usize],
        _ => "Unknown",
    }
}

fn check_month(jm: u32) -> Result<()> {
    if (1..=12).contains(&jm) {
        Ok(())
    } else {
        Err(Error::invalid_date(format!(
            "Jalali month must be between 1 and 12, got {jm}"
        )))
    }
}

const fn is_gregorian_leap(gy: i64) -> bool {
    (gy % 4 == 0 && gy % 100 != 0) || gy % 400 == 0
}
