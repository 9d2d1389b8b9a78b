//! SQLite call record store.
//!
//! `merge` is the only write path: a read-modify-write of the full JSON
//! document inside an IMMEDIATE transaction. SQLite holds a single writer
//! lock per database, so merges to the same key serialize (merges to
//! different keys serialize too, which is stronger than required but
//! harmless at webhook volumes). A failed merge rolls back; there is no
//! half-written record state.

use std::path::Path;

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use callreach_core::{apply_patch, env_parse_with_default, CallPatch, CallRecord};

use crate::error::StorageError;
use crate::migrations;

type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Keyed durable storage of call records plus the voicemail-sid
/// correlation index.
#[derive(Clone, Debug)]
pub struct CallStore {
    pool: Pool<SqliteConnectionManager>,
}

fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    pool.get().map_err(StorageError::from)
}

fn db_pool_size() -> u32 {
    env_parse_with_default("CALLREACH_DB_POOL_SIZE", 8)
}

impl CallStore {
    /// Open (and migrate) the store at the given path.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder().max_size(db_pool_size()).build(manager)?;
        let conn = get_conn(&pool)?;
        migrations::run_migrations(&conn).map_err(|e| StorageError::Migration(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Fetch one record by call SID.
    pub fn get(&self, call_sid: &str) -> Result<Option<CallRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let json: Option<String> = conn
            .query_row(
                "SELECT record FROM call_records WHERE call_sid = ?1",
                params![call_sid],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| parse_record(&j, call_sid)).transpose()
    }

    /// Atomically merge a patch into the record for `call_sid`, creating
    /// the record if this SID has never been seen. Returns the merged
    /// record.
    ///
    /// The read, the patch application (including the voicemail/SMS
    /// first-writer-wins guards), and the write all happen inside one
    /// IMMEDIATE transaction, so two racing webhooks for the same key
    /// cannot lose updates or double-attach a fallback sub-record.
    pub fn merge(&self, call_sid: &str, patch: &CallPatch) -> Result<CallRecord, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT record FROM call_records WHERE call_sid = ?1",
                params![call_sid],
                |row| row.get(0),
            )
            .optional()?;
        let existing = existing.map(|j| parse_record(&j, call_sid)).transpose()?;

        let merged = apply_patch(existing, call_sid, patch, Utc::now());
        let json = serde_json::to_string(&merged)?;
        let voicemail_sid = merged.voicemail.as_ref().map(|vm| vm.sid.as_str());

        tx.execute(
            "INSERT INTO call_records (call_sid, record, voicemail_sid, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(call_sid) DO UPDATE SET
                 record = excluded.record,
                 voicemail_sid = excluded.voicemail_sid,
                 updated_at = excluded.updated_at",
            params![
                call_sid,
                json,
                voicemail_sid,
                merged.created_at.to_rfc3339(),
                merged.updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(merged)
    }

    /// All records, order irrelevant.
    pub fn list_all(&self) -> Result<Vec<CallRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT call_sid, record FROM call_records")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (call_sid, json) = row?;
            match parse_record(&json, &call_sid) {
                Ok(record) => records.push(record),
                // One corrupt row should not hide every other record.
                Err(e) => tracing::warn!(%call_sid, error = %e, "skipping unreadable call record"),
            }
        }
        Ok(records)
    }

    /// Correlation index: find the originating call record whose voicemail
    /// attempt carries this SID. Miss is `None`, not an error.
    ///
    /// The index column is written in the same transaction as the merge
    /// that attaches the voicemail, so any webhook that happens-after that
    /// merge observes it.
    pub fn find_by_voicemail_sid(&self, sid: &str) -> Result<Option<CallRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT call_sid, record FROM call_records WHERE voicemail_sid = ?1",
                params![sid],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(call_sid, json)| parse_record(&json, &call_sid)).transpose()
    }
}

fn parse_record(json: &str, call_sid: &str) -> Result<CallRecord, StorageError> {
    serde_json::from_str(json).map_err(|source| StorageError::DataCorruption {
        context: format!("call record for {call_sid}"),
        source,
    })
}
