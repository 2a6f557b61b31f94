//! Program schedule CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{
    row_timestamp, to_unix, Database, DatabaseError, NewProgram, ProgramRecord, ProgramState,
    Result,
};
use crate::store::ProgramStore;

impl Database {
    /// Insert a new program.
    pub fn insert_program(&self, program: &NewProgram) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO programs (
                channel_id, start_time, end_time, title, description, category_id,
                star_rating, classification, parental_rating, state
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                program.channel_id,
                to_unix(program.start_time),
                to_unix(program.end_time),
                program.title,
                program.description,
                program.category_id,
                program.star_rating,
                program.classification,
                program.parental_rating,
                program.state.bits(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every column of an existing program.
    pub fn update_program(&self, program: &ProgramRecord) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE programs SET
                start_time = ?2, end_time = ?3, title = ?4, description = ?5, category_id = ?6,
                star_rating = ?7, classification = ?8, parental_rating = ?9, state = ?10
             WHERE id = ?1",
            params![
                program.id,
                to_unix(program.start_time),
                to_unix(program.end_time),
                program.title,
                program.description,
                program.category_id,
                program.star_rating,
                program.classification,
                program.parental_rating,
                program.state.bits(),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::ProgramNotFound(program.id));
        }
        Ok(())
    }

    /// Delete a program by ID.
    pub fn delete_program(&self, program_id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM programs WHERE id = ?1", [program_id])?;
        if changed == 0 {
            return Err(DatabaseError::ProgramNotFound(program_id));
        }
        Ok(())
    }

    /// Delete programs of a channel that ended before `now`.
    pub fn delete_programs_ended_before(&self, channel_id: i64, now: DateTime<Utc>) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM programs WHERE channel_id = ?1 AND end_time < ?2",
            params![channel_id, to_unix(now)],
        )?;
        Ok(deleted)
    }

    /// Get all programs of a channel, ascending by start time.
    pub fn get_programs_by_channel(&self, channel_id: i64) -> Result<Vec<ProgramRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM programs WHERE channel_id = ?1 ORDER BY start_time, id",
        )?;

        let records = stmt
            .query_map([channel_id], Self::row_to_program_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get programs of a channel that have not ended by `since`, ascending by start time.
    pub fn get_programs_since(&self, channel_id: i64, since: DateTime<Utc>) -> Result<Vec<ProgramRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM programs WHERE channel_id = ?1 AND end_time > ?2 ORDER BY start_time, id",
        )?;

        let records = stmt
            .query_map(params![channel_id, to_unix(since)], Self::row_to_program_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get programs occupying exactly the given slot, oldest row first.
    pub fn get_programs_by_slot(
        &self,
        channel_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM programs
             WHERE channel_id = ?1 AND start_time = ?2 AND end_time = ?3
             ORDER BY id",
        )?;

        let records = stmt
            .query_map(
                params![channel_id, to_unix(start), to_unix(end)],
                Self::row_to_program_record,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Start time of the latest-starting program of a channel.
    pub fn get_newest_program_start_time(&self, channel_id: i64) -> Result<Option<DateTime<Utc>>> {
        let secs: Option<i64> = self.conn.query_row(
            "SELECT MAX(start_time) FROM programs WHERE channel_id = ?1",
            [channel_id],
            |row| row.get(0),
        )?;

        secs.map(super::from_unix).transpose()
    }

    /// Helper: Convert a row to ProgramRecord.
    fn row_to_program_record(row: &rusqlite::Row) -> rusqlite::Result<ProgramRecord> {
        Ok(ProgramRecord {
            id: row.get("id")?,
            channel_id: row.get("channel_id")?,
            start_time: row_timestamp(row, "start_time")?,
            end_time: row_timestamp(row, "end_time")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category_id: row.get("category_id")?,
            star_rating: row.get::<_, Option<i32>>("star_rating")?.unwrap_or(0),
            classification: row.get("classification")?,
            parental_rating: row.get::<_, Option<i32>>("parental_rating")?.unwrap_or(-1),
            state: ProgramState::from_bits(row.get::<_, Option<u32>>("state")?.unwrap_or(0)),
        })
    }
}

impl ProgramStore for Database {
    fn delete_old_programs(&self, channel_id: i64, now: DateTime<Utc>) -> Result<usize> {
        self.delete_programs_ended_before(channel_id, now)
    }

    fn get_programs(&self, channel_id: i64, since: DateTime<Utc>) -> Result<Vec<ProgramRecord>> {
        self.get_programs_since(channel_id, since)
    }

    fn get_newest_program_start(&self, channel_id: i64) -> Result<Option<DateTime<Utc>>> {
        self.get_newest_program_start_time(channel_id)
    }

    fn find_programs_exact(
        &self,
        channel_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramRecord>> {
        self.get_programs_by_slot(channel_id, start, end)
    }

    fn insert_program(&self, program: &NewProgram) -> Result<i64> {
        Database::insert_program(self, program)
    }

    fn update_program(&self, program: &ProgramRecord) -> Result<()> {
        Database::update_program(self, program)
    }

    fn delete_program(&self, program_id: i64) -> Result<()> {
        Database::delete_program(self, program_id)
    }
}
