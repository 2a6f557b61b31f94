//! Program category operations.

use rusqlite::params;

use super::{Database, Result};
use crate::store::CategoryResolver;

impl Database {
    /// Get category ID by name, creating the category if it doesn't exist.
    pub fn get_or_create_category(&self, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO program_categories (name) VALUES (?1)",
            params![name],
        )?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM program_categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// Get all category names, ordered by ID.
    pub fn get_categories(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM program_categories ORDER BY id")?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }
}

impl CategoryResolver for Database {
    fn resolve_category(&self, genre: &str) -> Result<Option<i64>> {
        let genre = genre.trim();
        if genre.is_empty() {
            return Ok(None);
        }
        self.get_or_create_category(genre).map(Some)
    }
}
