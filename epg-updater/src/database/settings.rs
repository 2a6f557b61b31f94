//! Key/value settings storage.

use rusqlite::params;

use super::{Database, Result};
use crate::store::SettingsSource;

impl Database {
    /// Get a setting value by name.
    pub fn get_setting_value(&self, name: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM settings WHERE name = ?1",
            params![name],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace a setting.
    pub fn set_setting(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (name, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![name, value],
        )?;
        Ok(())
    }

    /// Get all settings, ordered by name.
    pub fn get_settings(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM settings ORDER BY name")?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }
}

impl SettingsSource for Database {
    fn get_setting(&self, name: &str) -> Result<Option<String>> {
        self.get_setting_value(name)
    }
}
