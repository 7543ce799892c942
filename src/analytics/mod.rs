//! Analytics and statistics module
//!
//! Rolls recorded sessions up into day, week and Jalali month summaries, and
//! indexes which days of a month saw any study at all.

mod study_days;

pub use study_days::{compute_study_days, StudyDayIndex, StudyDaySet};

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::calendar::JalaliMonth;
use crate::date_range::{DateRange, Window};
use crate::error::Result;
use crate::store::{SessionRow, SessionStore};
use crate::types::Seconds;

/// Total study time of one subject within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTotal {
    pub subject: String,
    pub total: Seconds,
}

/// Study time over a window, broken down by subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub range: DateRange,
    pub total: Seconds,
    /// Sorted by total, largest first
    pub subjects: Vec<SubjectTotal>,
}

impl PeriodSummary {
    /// Summarize the given rows over `range`.
    ///
    /// Equal totals keep the order in which their subject first appears in
    /// `rows`.
    #[must_use]
    pub fn from_rows(range: DateRange, rows: &[SessionRow]) -> Self {
        let mut subjects: Vec<SubjectTotal> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for row in rows {
            if let Some(&idx) = positions.get(row.subject.as_str()) {
                subjects[idx].total += row.duration;
            } else {
                positions.insert(row.subject.as_str(), subjects.len());
                subjects.push(SubjectTotal {
                    subject: row.subject.clone(),
                    total: row.duration,
                });
            }
        }

        // Stable, so ties stay in first-appearance order
        subjects.sort_by(|a, b| b.total.cmp(&a.total));

        Self {
            range,
            total: rows.iter().map(|r| r.duration).sum(),
            subjects,
        }
    }

    /// The subject with the most time, if any session was recorded.
    #[must_use]
    pub fn most_studied(&self) -> Option<&SubjectTotal> {
        self.subjects.first()
    }

    /// Whether no session fell within the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Window label, e.g. `Farvardin 1403`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.range.display_name
    }
}

/// A single day: the summary plus every session in time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub summary: PeriodSummary,
    pub sessions: Vec<SessionRow>,
}

/// Window-shaped, read-only queries over a session store.
pub struct SessionAggregator<'a, S: SessionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SessionStore + ?Sized> SessionAggregator<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Summarize any window.
    pub fn summarize(&self, window: Window) -> Result<PeriodSummary> {
        let range = window.resolve()?;
        let rows = self.fetch(&range)?;
        Ok(PeriodSummary::from_rows(range, &rows))
    }

    /// Sessions of one Gregorian day, ascending by time.
    pub fn day(&self, date: NaiveDate) -> Result<DayReport> {
        let range = Window::Day(date).resolve()?;
        let sessions = self.fetch(&range)?;
        Ok(DayReport {
            summary: PeriodSummary::from_rows(range, &sessions),
            sessions,
        })
    }

    /// The Saturday-to-Friday week containing `date`.
    pub fn week(&self, date: NaiveDate) -> Result<PeriodSummary> {
        self.summarize(Window::Week(date))
    }

    /// A Jalali month. Fails with `InvalidDate` for months outside 1..=12.
    pub fn month(&self, month: JalaliMonth) -> Result<PeriodSummary> {
        self.summarize(Window::Month(month))
    }

    fn fetch(&self, range: &DateRange) -> Result<Vec<SessionRow>> {
        let rows = self
            .store
            .list_sessions_in_range(range.start_bound(), range.end_bound())?;
        debug!(window = %range, sessions = rows.len(), "Aggregating window");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::Error;
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn minutes(m: f64) -> Seconds {
        Seconds::from_minutes_f64(m).unwrap()
    }

    fn assert_additive(summary: &PeriodSummary) {
        let by_subject: Seconds = summary.subjects.iter().map(|s| s.total).sum();
        assert_eq!(summary.total, by_subject);
    }

    #[test]
    fn test_month_scenario() {
        let db = Database::open_in_memory().unwrap();
        let math = db.add_subject("Math", 0).unwrap();
        db.add_session(math, minutes(25.0), at(2024, 3, 21, 9, 0))
            .unwrap();
        db.add_session(math, minutes(15.5), at(2024, 3, 21, 18, 30))
            .unwrap();

        let farvardin = JalaliMonth { year: 1403, month: 1 };
        let summary = SessionAggregator::new(&db).month(farvardin).unwrap();

        assert!((summary.total.as_minutes_f64() - 40.5).abs() < f64::EPSILON);
        assert_eq!(summary.subjects.len(), 1);
        assert_eq!(summary.subjects[0].subject, "Math");
        assert_eq!(summary.subjects[0].total.to_minutes_string(), "40.50");
        assert_eq!(summary.label(), "Farvardin 1403");
        assert_additive(&summary);

        let days = StudyDayIndex::new(&db).for_month(farvardin).unwrap();
        assert_eq!(days.iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_week_spans_jalali_new_year() {
        let db = Database::open_in_memory().unwrap();
        let math = db.add_subject("Math", 0).unwrap();
        let art = db.add_subject("Art", 0).unwrap();
        // 1402/12/29 and 1403/01/01 fall in the same Saturday-first week
        db.add_session(math, minutes(30.0), at(2024, 3, 19, 20, 0))
            .unwrap();
        db.add_session(art, minutes(20.0), at(2024, 3, 20, 8, 0))
            .unwrap();
        db.add_session(math, minutes(10.0), at(2024, 3, 20, 23, 59))
            .unwrap();
        // Next week
        db.add_session(art, minutes(90.0), at(2024, 3, 23, 8, 0))
            .unwrap();

        let summary = SessionAggregator::new(&db).week(date(2024, 3, 19)).unwrap();
        assert_eq!(summary.total, Seconds::from_mins(60));
        assert_eq!(summary.most_studied().unwrap().subject, "Math");
        assert_eq!(summary.subjects[0].total, Seconds::from_mins(40));
        assert_eq!(summary.subjects[1].total, Seconds::from_mins(20));
        assert_additive(&summary);

        // Any day of the week gives the same window
        let friday = SessionAggregator::new(&db).week(date(2024, 3, 22)).unwrap();
        assert_eq!(friday, summary);
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let db = Database::open_in_memory().unwrap();
        let summary = SessionAggregator::new(&db).week(date(2024, 3, 19)).unwrap();
        assert!(summary.is_empty());
        assert!(summary.total.is_zero());
        assert!(summary.most_studied().is_none());
    }

    #[test]
    fn test_ties_keep_store_order() {
        let db = Database::open_in_memory().unwrap();
        let math = db.add_subject("Math", 0).unwrap();
        let art = db.add_subject("Art", 0).unwrap();
        let zoology = db.add_subject("Zoology", 0).unwrap();
        db.add_session(zoology, minutes(10.0), at(2024, 3, 21, 8, 0))
            .unwrap();
        db.add_session(art, minutes(10.0), at(2024, 3, 21, 9, 0))
            .unwrap();
        db.add_session(math, minutes(25.0), at(2024, 3, 21, 10, 0))
            .unwrap();

        let summary = SessionAggregator::new(&db).day(date(2024, 3, 21)).unwrap().summary;
        let names: Vec<&str> = summary.subjects.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(names, vec!["Math", "Zoology", "Art"]);
    }

    #[test]
    fn test_day_report_lists_sessions_in_time_order() {
        let db = Database::open_in_memory().unwrap();
        let math = db.add_subject("Math", 0).unwrap();
        let art = db.add_subject("Art", 0).unwrap();
        db.add_session(art, minutes(5.0), at(2024, 3, 21, 14, 5))
            .unwrap();
        db.add_session(math, minutes(25.0), at(2024, 3, 21, 9, 15))
            .unwrap();
        db.add_session(math, minutes(25.0), at(2024, 3, 22, 0, 0))
            .unwrap();

        let report = SessionAggregator::new(&db).day(date(2024, 3, 21)).unwrap();
        assert_eq!(report.sessions.len(), 2);
        assert_eq!(report.sessions[0].subject, "Math");
        assert_eq!(report.sessions[0].time_of_day(), "09:15");
        assert_eq!(report.sessions[1].time_of_day(), "14:05");
        assert_eq!(report.summary.total, Seconds::from_mins(30));
        assert_additive(&report.summary);
    }

    #[test]
    fn test_month_total_matches_sessions_in_window() {
        let db = Database::open_in_memory().unwrap();
        let math = db.add_subject("Math", 0).unwrap();
        let physics = db.add_subject("Physics", 0).unwrap();
        // Last second of Esfand 1402 and first second of Farvardin 1403
        db.add_session(math, minutes(7.25), at(2024, 3, 19, 23, 59))
            .unwrap();
        db.add_session(physics, minutes(3.5), at(2024, 3, 20, 0, 0))
            .unwrap();
        db.add_session(math, minutes(1.0), at(2024, 4, 19, 23, 0))
            .unwrap();

        let aggregator = SessionAggregator::new(&db);
        let esfand = aggregator.month(JalaliMonth { year: 1402, month: 12 }).unwrap();
        let farvardin = aggregator.month(JalaliMonth { year: 1403, month: 1 }).unwrap();

        assert_eq!(esfand.total, minutes(7.25));
        assert_eq!(farvardin.total, minutes(4.5));
        assert_eq!(farvardin.most_studied().unwrap().subject, "Physics");
        assert_additive(&esfand);
        assert_additive(&farvardin);
    }

    #[test]
    fn test_invalid_month_propagates() {
        let db = Database::open_in_memory().unwrap();
        let result = SessionAggregator::new(&db).month(JalaliMonth { year: 1403, month: 13 });
        assert!(matches!(result, Err(Error::InvalidDate(_))));
    }
}
