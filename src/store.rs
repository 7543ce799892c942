//! Read interface of the session store.
//!
//! The aggregation code only ever reads through [`SessionStore`]. Writes
//! (subjects, sessions) live on the concrete [`Database`](crate::db::Database).

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::types::Seconds;

/// A study subject with its target and accumulated time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    /// Target study time in minutes (0 = no target)
    pub target_minutes: i64,
    /// Total recorded study time
    pub done: Seconds,
}

impl Subject {
    /// Progress towards the target in percent, capped at 100.
    ///
    /// A subject without a target counts against a one-minute target.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u8 {
        let target = self.target_minutes.max(1).saturating_mul(60);
        let percent = self.done.get().max(0).saturating_mul(100) / target;
        percent.min(100) as u8
    }

    /// Whether a target is set and has been reached.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.target_minutes > 0 && self.done.get() >= self.target_minutes.saturating_mul(60)
    }
}

/// A session of one subject, as listed in the subject's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectSession {
    pub duration: Seconds,
    pub timestamp: NaiveDateTime,
}

/// A session joined with its subject name, as returned by range queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRow {
    pub subject: String,
    pub duration: Seconds,
    pub timestamp: NaiveDateTime,
}

impl SessionRow {
    /// Time of day as `HH:MM`.
    #[must_use]
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Read-only access to recorded sessions and subjects.
///
/// Implementations must return each result from a consistent snapshot;
/// range bounds are inclusive on both ends.
pub trait SessionStore {
    /// Sessions of one subject, ascending by timestamp.
    fn list_sessions_for_subject(&self, subject_id: i64) -> Result<Vec<SubjectSession>>;

    /// Sessions with `start <= timestamp <= end`, ascending by timestamp and
    /// then by insertion order.
    fn list_sessions_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SessionRow>>;

    /// Timestamps of every recorded session.
    fn list_all_session_timestamps(&self) -> Result<Vec<NaiveDateTime>>;

    /// Timestamps with `start <= timestamp <= end`.
    ///
    /// The default filters [`list_all_session_timestamps`](Self::list_all_session_timestamps);
    /// stores that can filter natively should override it.
    fn list_session_timestamps_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>> {
        Ok(self
            .list_all_session_timestamps()?
            .into_iter()
            .filter(|ts| *ts >= start && *ts <= end)
            .collect())
    }

    /// All subjects, in creation order.
    fn list_subjects(&self) -> Result<Vec<Subject>>;
}
