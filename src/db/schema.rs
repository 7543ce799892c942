//! Database schema initialization

use duckdb::Connection;

use crate::error::Result;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        CREATE SEQUENCE IF NOT EXISTS subjects_id_seq;
        CREATE SEQUENCE IF NOT EXISTS sessions_id_seq;

        CREATE TABLE IF NOT EXISTS subjects (
            id BIGINT PRIMARY KEY DEFAULT nextval('subjects_id_seq'),
            name VARCHAR NOT NULL UNIQUE,
            target_minutes BIGINT NOT NULL DEFAULT 0,
            -- Accumulated study time in whole seconds
            done_seconds BIGINT NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id BIGINT PRIMARY KEY DEFAULT nextval('sessions_id_seq'),
            subject_id BIGINT NOT NULL,
            seconds BIGINT NOT NULL,
            -- Naive local wall-clock time
            ts TIMESTAMP NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_ts ON sessions(ts);
        CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(subject_id);
        ",
    )?;

    Ok(())
}
