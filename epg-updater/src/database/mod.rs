//! Database module for schedule storage.
//!
//! This module provides SQLite-based persistent storage for:
//! - Channels and their tuning details (NID/TSID/SID-based identification)
//! - The program schedule per channel
//! - Program categories and key/value settings
//!
//! `Database` owns a single connection and is not `Sync`. Callers that
//! reconcile several tuners at once share it behind a mutex, which serializes
//! every read-check-then-write pass per channel.

mod category;
mod channel;
mod models;
mod program;
mod schema;
mod settings;

pub use models::*;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Channel not found: {0}")]
    ChannelNotFound(i64),

    #[error("Program not found: {0}")]
    ProgramNotFound(i64),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Get the underlying connection (for advanced queries).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

/// Convert a timestamp to the stored unix seconds.
pub(crate) fn to_unix(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// Convert stored unix seconds back to a timestamp.
pub(crate) fn from_unix(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(DatabaseError::InvalidTimestamp(secs))
}

/// Read a unix-seconds column as a timestamp.
pub(crate) fn row_timestamp(row: &rusqlite::Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(column)?;
    from_unix(secs).map_err(|e| {
        let index = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Integer, Box::new(e))
    })
}

/// Read a nullable unix-seconds column as a timestamp.
pub(crate) fn row_opt_timestamp(
    row: &rusqlite::Row,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(_) => row_timestamp(row, column).map(Some),
        None => Ok(None),
    }
}
