//! Countdown timer for a study session.
//!
//! The timer ticks once per `tick` until either the duration elapses or the
//! cancel future resolves (Ctrl-C in the CLI). Either way the elapsed time is
//! reported so it can be recorded as a session.

use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::Seconds;

/// Default session length
pub const DEFAULT_DURATION: Duration = Duration::from_secs(25 * 60);

/// Parse a human duration such as `25m` or `1h30m`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(s.trim())
        .map_err(|e| Error::invalid_input(format!("Invalid duration '{s}': {e}")))?;
    if duration.is_zero() {
        return Err(Error::invalid_input("Timer duration must be positive"));
    }
    Ok(duration)
}

/// How a timer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerOutcome {
    /// Time spent, capped at the configured duration
    pub elapsed: Duration,
    /// Whether the full duration ran out
    pub completed: bool,
}

impl TimerOutcome {
    /// Elapsed whole seconds to record, or `None` when nothing was studied.
    #[must_use]
    pub const fn recorded(&self) -> Option<Seconds> {
        let seconds = Seconds::from_duration(self.elapsed);
        if seconds.is_zero() {
            None
        } else {
            Some(seconds)
        }
    }

    /// Record the elapsed time as a session of `subject_id`, stamped with the
    /// current local time. Returns what was recorded; nothing is written when
    /// no whole second elapsed.
    pub fn record(&self, db: &Database, subject_id: i64) -> Result<Option<Seconds>> {
        let Some(seconds) = self.recorded() else {
            return Ok(None);
        };
        db.add_session(subject_id, seconds, Local::now().naive_local())?;
        Ok(Some(seconds))
    }
}

/// A study session countdown.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimer {
    duration: Duration,
    tick: Duration,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl SessionTimer {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            tick: Duration::from_secs(1),
        }
    }

    /// Override the tick interval.
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Configured countdown length.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Run the countdown.
    ///
    /// `on_tick` receives the remaining time after every tick.
    pub async fn run<C, F>(&self, cancel: C, mut on_tick: F) -> TimerOutcome
    where
        C: Future<Output = ()>,
        F: FnMut(Duration),
    {
        let start = Instant::now();
        let deadline = start + self.duration;
        tokio::pin!(cancel);

        info!(duration = %humantime::format_duration(self.duration), "Timer started");

        let completed = loop {
            let now = Instant::now();
            if now >= deadline {
                break true;
            }
            let next = (now + self.tick).min(deadline);

            tokio::select! {
                () = &mut cancel => {
                    debug!("Timer cancelled");
                    break false;
                }
                () = tokio::time::sleep_until(next) => {
                    on_tick(deadline.saturating_duration_since(Instant::now()));
                }
            }
        };

        let elapsed = if completed {
            self.duration
        } else {
            start.elapsed().min(self.duration)
        };

        info!(
            elapsed = %humantime::format_duration(Duration::from_secs(elapsed.as_secs())),
            completed,
            "Timer stopped"
        );
        TimerOutcome { elapsed, completed }
    }
}
