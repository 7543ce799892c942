//! Database module using DuckDB
//!
//! Persistent session store for subjects and study sessions. A single
//! connection sits behind a mutex, which serializes writes against reads so
//! every read sees a consistent snapshot.

mod filter;
mod queries;
mod schema;

pub use filter::{TimestampFilter, TIMESTAMP_FORMAT};

use chrono::NaiveDateTime;
use duckdb::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::store::{SessionRow, SessionStore, Subject, SubjectSession};
use crate::types::Seconds;

/// Database wrapper for study sessions using DuckDB
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file
    ///
    /// # Arguments
    /// * `config` - Database configuration
    /// * `data_dir` - Default data directory for the database file
    pub fn open(config: &DatabaseConfig, data_dir: &Path) -> Result<Self> {
        let db_path = Self::resolve_path(config, data_dir)?;
        let conn = Connection::open(&db_path)?;
        info!(path = %db_path.display(), "Opened database");
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Database file location, creating parent directories as needed
    fn resolve_path(config: &DatabaseConfig, data_dir: &Path) -> Result<PathBuf> {
        if let Some(ref path) = config.path {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(path.to_path_buf())
        } else {
            std::fs::create_dir_all(data_dir)?;
            Ok(data_dir.join("study.duckdb"))
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::other("Database connection lock poisoned"))
    }

    /// Add a subject, returning its id. An existing name returns the existing id.
    pub fn add_subject(&self, name: &str, target_minutes: i64) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("Subject name cannot be empty"));
        }
        if target_minutes < 0 {
            return Err(Error::invalid_input(format!(
                "Target must be non-negative, got {target_minutes}"
            )));
        }
        let conn = self.lock()?;
        queries::insert_subject(&conn, name, target_minutes)
    }

    /// Delete a subject together with all of its sessions
    pub fn delete_subject(&self, subject_id: i64) -> Result<()> {
        let mut conn = self.lock()?;
        queries::delete_subject(&mut conn, subject_id)
    }

    /// Change a subject's target
    pub fn update_target(&self, subject_id: i64, minutes: i64) -> Result<()> {
        if minutes < 0 {
            return Err(Error::invalid_input(format!(
                "Target must be non-negative, got {minutes}"
            )));
        }
        let conn = self.lock()?;
        queries::update_target(&conn, subject_id, minutes)
    }

    /// Record a completed session
    pub fn add_session(
        &self,
        subject_id: i64,
        duration: Seconds,
        timestamp: NaiveDateTime,
    ) -> Result<()> {
        if duration.get() < 0 {
            return Err(Error::invalid_input(format!(
                "Session duration must be non-negative, got {duration}"
            )));
        }
        let mut conn = self.lock()?;
        queries::insert_session(&mut conn, subject_id, duration, timestamp)
    }

    /// Look up a subject by name
    pub fn find_subject(&self, name: &str) -> Result<Option<Subject>> {
        let conn = self.lock()?;
        queries::find_subject(&conn, name.trim())
    }

    /// Look up a subject by name, failing if it does not exist
    pub fn subject_by_name(&self, name: &str) -> Result<Subject> {
        self.find_subject(name)?
            .ok_or_else(|| Error::SubjectNotFound(name.trim().to_string()))
    }

    /// Get total session count
    pub fn session_count(&self) -> Result<i64> {
        let conn = self.lock()?;
        queries::get_session_count(&conn)
    }
}

impl SessionStore for Database {
    fn list_sessions_for_subject(&self, subject_id: i64) -> Result<Vec<SubjectSession>> {
        let conn = self.lock()?;
        queries::list_sessions_for_subject(&conn, subject_id)
    }

    fn list_sessions_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SessionRow>> {
        let conn = self.lock()?;
        queries::list_sessions(&conn, TimestampFilter::between(start, end))
    }

    fn list_all_session_timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        let conn = self.lock()?;
        queries::list_session_timestamps(&conn, TimestampFilter::default())
    }

    fn list_session_timestamps_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>> {
        let conn = self.lock()?;
        queries::list_session_timestamps(&conn, TimestampFilter::between(start, end))
    }

    fn list_subjects(&self) -> Result<Vec<Subject>> {
        let conn = self.lock()?;
        queries::list_subjects(&conn)
    }
}
