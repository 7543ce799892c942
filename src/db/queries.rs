//! Database query implementations for DuckDB

use chrono::NaiveDateTime;
use duckdb::{params, Connection, OptionalExt};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{SessionRow, Subject, SubjectSession};
use crate::types::Seconds;

use super::filter::{TimestampFilter, TIMESTAMP_FORMAT};

/// Timestamp column rendered back into [`TIMESTAMP_FORMAT`].
const TS_SQL: &str = "strftime(s.ts, '%Y-%m-%d %H:%M:%S')";

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| Error::other(format!("Unreadable session timestamp '{raw}': {e}")))
}

fn subject_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        target_minutes: row.get(2)?,
        done: Seconds::new(row.get(3)?),
    })
}

/// Insert a subject, or return the id of the existing one with that name.
pub fn insert_subject(conn: &Connection, name: &str, target_minutes: i64) -> Result<i64> {
    if let Some(existing) = find_subject(conn, name)? {
        debug!(name, id = existing.id, "Subject already exists");
        return Ok(existing.id);
    }

    let id: i64 = conn.query_row(
        "INSERT INTO subjects (name, target_minutes) VALUES (?, ?) RETURNING id",
        params![name, target_minutes],
        |row| row.get(0),
    )?;
    info!(name, id, target_minutes, "Added subject");
    Ok(id)
}

/// Delete a subject and all of its sessions
pub fn delete_subject(conn: &mut Connection, subject_id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let sessions = tx.execute("DELETE FROM sessions WHERE subject_id = ?", [subject_id])?;
    let subjects = tx.execute("DELETE FROM subjects WHERE id = ?", [subject_id])?;
    tx.commit()?;

    if subjects == 0 {
        return Err(Error::SubjectNotFound(format!("id {subject_id}")));
    }
    info!(subject_id, sessions, "Deleted subject");
    Ok(())
}

/// Set a subject's target in minutes
pub fn update_target(conn: &Connection, subject_id: i64, minutes: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE subjects SET target_minutes = ? WHERE id = ?",
        params![minutes, subject_id],
    )?;
    if updated == 0 {
        return Err(Error::SubjectNotFound(format!("id {subject_id}")));
    }
    Ok(())
}

/// Record a session and add its duration to the subject total in one transaction
pub fn insert_session(
    conn: &mut Connection,
    subject_id: i64,
    duration: Seconds,
    timestamp: NaiveDateTime,
) -> Result<()> {
    let tx = conn.transaction()?;
    let updated = tx.execute(
        "UPDATE subjects SET done_seconds = done_seconds + ? WHERE id = ?",
        params![duration.get(), subject_id],
    )?;
    if updated == 0 {
        // Dropping the transaction rolls it back
        return Err(Error::SubjectNotFound(format!("id {subject_id}")));
    }
    tx.execute(
        "INSERT INTO sessions (subject_id, seconds, ts) VALUES (?, ?, CAST(? AS TIMESTAMP))",
        params![
            subject_id,
            duration.get(),
            timestamp.format(TIMESTAMP_FORMAT).to_string()
        ],
    )?;
    tx.commit()?;

    info!(subject_id, seconds = duration.get(), %timestamp, "Recorded session");
    Ok(())
}

/// Look up a subject by exact name
pub fn find_subject(conn: &Connection, name: &str) -> Result<Option<Subject>> {
    let subject = conn
        .query_row(
            "SELECT id, name, target_minutes, done_seconds FROM subjects WHERE name = ?",
            [name],
            subject_from_row,
        )
        .optional()?;
    Ok(subject)
}

/// List all subjects in creation order
pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt = conn
        .prepare("SELECT id, name, target_minutes, done_seconds FROM subjects ORDER BY id")?;
    let rows = stmt.query_map([], subject_from_row)?;

    let mut subjects = Vec::new();
    for row in rows {
        subjects.push(row?);
    }
    Ok(subjects)
}

/// Sessions of one subject, oldest first
pub fn list_sessions_for_subject(conn: &Connection, subject_id: i64) -> Result<Vec<SubjectSession>> {
    let query = format!(
        "SELECT s.seconds, {TS_SQL} FROM sessions s WHERE s.subject_id = ? ORDER BY s.ts, s.id"
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([subject_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        let (seconds, ts) = row?;
        sessions.push(SubjectSession {
            duration: Seconds::new(seconds),
            timestamp: parse_timestamp(&ts)?,
        });
    }
    Ok(sessions)
}

/// Sessions joined with subject names within a timestamp filter
pub fn list_sessions(conn: &Connection, filter: TimestampFilter) -> Result<Vec<SessionRow>> {
    let mut query = format!(
        r"
        SELECT sub.name, s.seconds, {TS_SQL}
        FROM sessions s
        JOIN subjects sub ON s.subject_id = sub.id
        WHERE 1=1
        "
    );
    let mut param_values = Vec::new();
    filter.apply(&mut query, &mut param_values);
    query.push_str(" ORDER BY s.ts, s.id");

    let params = TimestampFilter::params_as_refs(&param_values);
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        let (subject, seconds, ts) = row?;
        sessions.push(SessionRow {
            subject,
            duration: Seconds::new(seconds),
            timestamp: parse_timestamp(&ts)?,
        });
    }

    debug!(count = sessions.len(), "Loaded sessions");
    Ok(sessions)
}

/// Session timestamps within a timestamp filter
pub fn list_session_timestamps(
    conn: &Connection,
    filter: TimestampFilter,
) -> Result<Vec<NaiveDateTime>> {
    let mut query = format!("SELECT {TS_SQL} FROM sessions s WHERE 1=1");
    let mut param_values = Vec::new();
    filter.apply(&mut query, &mut param_values);
    query.push_str(" ORDER BY s.ts");

    let params = TimestampFilter::params_as_refs(&param_values);
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params.as_slice(), |row| row.get::<_, String>(0))?;

    let mut timestamps = Vec::new();
    for row in rows {
        timestamps.push(parse_timestamp(&row?)?);
    }
    Ok(timestamps)
}

/// Get total session count
pub fn get_session_count(conn: &Connection) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM sessions")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(count)
}
