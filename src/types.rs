//! Domain-specific newtypes for type safety.
//!
//! Study time is kept as fixed-point integer seconds so that totals built from
//! many small sessions never drift. Minutes only appear at the edges: parsing
//! user input and formatting output with two decimals.

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;
use std::time::Duration;

use derive_more::{Add as DeriveAdd, From, Into};
use serde::{Deserialize, Serialize};

// ============================================================================
// Seconds
// ============================================================================

/// A study duration in whole seconds.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    DeriveAdd,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Seconds(pub i64);

impl Seconds {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create a new instance.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Check if the value is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Create from whole minutes.
    #[must_use]
    pub const fn from_mins(mins: i64) -> Self {
        Self(mins * 60)
    }

    /// Create from fractional minutes, rounding to the nearest second.
    ///
    /// Negative and non-finite inputs are rejected with `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_minutes_f64(minutes: f64) -> Option<Self> {
        if !minutes.is_finite() || minutes < 0.0 {
            return None;
        }
        Some(Self((minutes * 60.0).round() as i64))
    }

    /// Whole seconds of a `std::time::Duration`, sub-second remainder dropped.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn from_duration(duration: Duration) -> Self {
        Self(duration.as_secs() as i64)
    }

    /// Convert to minutes as a floating point value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_minutes_f64(self) -> f64 {
        self.0 as f64 / 60.0
    }

    /// Minutes with two decimals, e.g. `40.50`.
    #[must_use]
    pub fn to_minutes_string(self) -> String {
        format!("{:.2}", self.as_minutes_f64())
    }
}

impl AddAssign for Seconds {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Seconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, s| acc + s)
    }
}

impl<'a> Sum<&'a Self> for Seconds {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;

        match (hours, minutes) {
            (0, 0) => write!(f, "{seconds}s"),
            (0, _) => write!(f, "{minutes}m {seconds}s"),
            _ => write!(f, "{hours}h {minutes}m {seconds}s"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let s = Seconds::new(90);
        assert_eq!(s.get(), 90);
        assert!(!s.is_zero());
        assert!(Seconds::default().is_zero());
    }

    #[test]
    fn from_fractional_minutes() {
        assert_eq!(Seconds::from_minutes_f64(25.0), Some(Seconds::new(1500)));
        assert_eq!(Seconds::from_minutes_f64(15.5), Some(Seconds::new(930)));
        assert_eq!(Seconds::from_minutes_f64(0.0), Some(Seconds::ZERO));
        assert_eq!(Seconds::from_minutes_f64(-1.0), None);
        assert_eq!(Seconds::from_minutes_f64(f64::NAN), None);
    }

    #[test]
    fn no_drift_over_many_small_increments() {
        // 1000 sessions of one tenth of a minute each
        let mut total = Seconds::ZERO;
        for _ in 0..1000 {
            total += Seconds::from_minutes_f64(0.1).unwrap();
        }
        assert_eq!(total, Seconds::from_mins(100));
        assert_eq!(total.to_minutes_string(), "100.00");
    }

    #[test]
    fn minutes_string_has_two_decimals() {
        assert_eq!(Seconds::new(2430).to_minutes_string(), "40.50");
        assert_eq!(Seconds::new(20).to_minutes_string(), "0.33");
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Seconds::new(5)), "5s");
        assert_eq!(format!("{}", Seconds::new(65)), "1m 5s");
        assert_eq!(format!("{}", Seconds::new(3665)), "1h 1m 5s");
    }

    #[test]
    fn sum_and_arithmetic() {
        let all = [Seconds::new(10), Seconds::new(20), Seconds::new(30)];
        assert_eq!(all.iter().sum::<Seconds>(), Seconds::new(60));
        assert_eq!(Seconds::new(1) + Seconds::new(2), Seconds::new(3));
        assert_eq!(Seconds::from_duration(Duration::from_millis(2500)), Seconds::new(2));
    }
}
