//! Days of a Jalali month that contain at least one study session.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{JalaliDate, JalaliMonth};
use crate::error::Result;
use crate::store::SessionStore;

/// Jalali day numbers with activity for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudyDaySet {
    pub month: Option<JalaliMonth>,
    days: BTreeSet<u32>,
}

impl StudyDaySet {
    #[must_use]
    pub fn contains(&self, day: u32) -> bool {
        self.days.contains(&day)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.days.iter().copied()
    }
}

/// Collect the days of `month` hit by any of `timestamps`.
///
/// Timestamps outside the month are ignored.
pub fn compute_study_days<I>(month: JalaliMonth, timestamps: I) -> StudyDaySet
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let days = timestamps
        .into_iter()
        .map(|ts| JalaliDate::from_gregorian(ts.date()))
        .filter(|j| j.year == month.year && j.month == month.month)
        .map(|j| j.day)
        .collect();

    StudyDaySet {
        month: Some(month),
        days,
    }
}

/// Study-day lookups against a session store.
pub struct StudyDayIndex<'a, S: SessionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SessionStore + ?Sized> StudyDayIndex<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Study days of a Jalali month.
    ///
    /// Only sessions inside the month's Gregorian range are read.
    pub fn for_month(&self, month: JalaliMonth) -> Result<StudyDaySet> {
        let range = month.date_range()?;
        let timestamps = self
            .store
            .list_session_timestamps_in_range(range.start_bound(), range.end_bound())?;
        let set = compute_study_days(month, timestamps);
        debug!(%month, days = set.len(), "Computed study days");
        Ok(set)
    }
}
