//! Versioned schema migrations tracked via SQLite `user_version`.

use rusqlite::Connection;

pub(crate) const SCHEMA_VERSION: i32 = 1;

const V1_SQL: &str = "
CREATE TABLE IF NOT EXISTS call_records (
    call_sid      TEXT PRIMARY KEY,
    record        TEXT NOT NULL,
    voicemail_sid TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_call_records_voicemail_sid
    ON call_records (voicemail_sid) WHERE voicemail_sid IS NOT NULL;
";

pub(crate) fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", 5000i32)?;

    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    tracing::info!("Database schema version: {} (target: {})", current_version, SCHEMA_VERSION);

    if current_version < 1i32 {
        tracing::info!("Running migration v1: call_records table and voicemail_sid index");
        conn.execute_batch(V1_SQL)?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
