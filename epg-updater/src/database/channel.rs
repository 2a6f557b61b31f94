//! Channel and tuning detail CRUD operations.

use chrono::{DateTime, Utc};
use epg_protocol::{BroadcastChannel, MediaType, TuningKey};
use rusqlite::params;

use super::{
    row_opt_timestamp, to_unix, ChannelRecord, Database, DatabaseError, NewChannel, Result,
    TuningDetailRecord,
};
use crate::store::ChannelStore;

impl Database {
    /// Insert a new channel.
    pub fn insert_channel(&self, channel: &NewChannel) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO channels (display_name, media_type, grab_epg) VALUES (?1, ?2, ?3)",
            params![
                channel.display_name,
                channel.media_type as i32,
                channel.grab_epg as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Attach a tuning detail to a channel.
    pub fn add_tuning_detail(&self, channel_id: i64, tuning: &BroadcastChannel) -> Result<i64> {
        let key = tuning.tuning_key();
        self.conn.execute(
            "INSERT INTO tuning_details (channel_id, standard, network_id, transport_id, service_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                channel_id,
                tuning.standard_name(),
                key.network_id as i32,
                key.transport_id as i32,
                key.service_id as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get channel by ID.
    pub fn get_channel(&self, channel_id: i64) -> Result<Option<ChannelRecord>> {
        let result = self.conn.query_row(
            "SELECT * FROM channels WHERE id = ?1",
            [channel_id],
            Self::row_to_channel_record,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all channels.
    pub fn get_channels(&self) -> Result<Vec<ChannelRecord>> {
        let mut stmt = self.conn.prepare("SELECT * FROM channels ORDER BY id")?;

        let records = stmt
            .query_map([], Self::row_to_channel_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get channel by exact tuning identity (NID/TSID/SID).
    pub fn get_channel_by_tuning_key(&self, key: &TuningKey) -> Result<Option<ChannelRecord>> {
        let result = self.conn.query_row(
            "SELECT c.* FROM channels c
             JOIN tuning_details td ON td.channel_id = c.id
             WHERE td.network_id = ?1 AND td.transport_id = ?2 AND td.service_id = ?3",
            params![
                key.network_id as i32,
                key.transport_id as i32,
                key.service_id as i32
            ],
            Self::row_to_channel_record,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get tuning details of a channel.
    pub fn get_tuning_details(&self, channel_id: i64) -> Result<Vec<TuningDetailRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, channel_id, standard, network_id, transport_id, service_id
             FROM tuning_details WHERE channel_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map([channel_id], |row| {
            Ok(TuningDetailRecord {
                id: row.get("id")?,
                channel_id: row.get("channel_id")?,
                standard: row.get("standard")?,
                key: TuningKey::new(
                    row.get::<_, i32>("network_id")? as u16,
                    row.get::<_, i32>("transport_id")? as u16,
                    row.get::<_, i32>("service_id")? as u16,
                ),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| e.into())
    }

    /// Select or deselect a channel for EPG grabbing.
    pub fn set_grab_epg(&self, channel_id: i64, grab_epg: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE channels SET grab_epg = ?2 WHERE id = ?1",
            params![channel_id, grab_epg as i32],
        )?;
        if changed == 0 {
            return Err(DatabaseError::ChannelNotFound(channel_id));
        }
        Ok(())
    }

    /// Record the time of the last grab and whether it left gaps.
    pub fn update_channel_grab_state(
        &self,
        channel_id: i64,
        last_grab_time: DateTime<Utc>,
        has_gaps: bool,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE channels SET last_grab_time = ?2, epg_has_gaps = ?3 WHERE id = ?1",
            params![channel_id, to_unix(last_grab_time), has_gaps as i32],
        )?;
        if changed == 0 {
            return Err(DatabaseError::ChannelNotFound(channel_id));
        }
        Ok(())
    }

    /// Helper: Convert a row to ChannelRecord.
    fn row_to_channel_record(row: &rusqlite::Row) -> rusqlite::Result<ChannelRecord> {
        Ok(ChannelRecord {
            id: row.get("id")?,
            display_name: row.get("display_name")?,
            media_type: MediaType::from_i32(row.get("media_type")?),
            grab_epg: row.get::<_, Option<i32>>("grab_epg")?.unwrap_or(1) != 0,
            epg_has_gaps: row.get::<_, Option<i32>>("epg_has_gaps")?.unwrap_or(0) != 0,
            last_grab_time: row_opt_timestamp(row, "last_grab_time")?,
            created_at: row.get::<_, Option<i64>>("created_at")?.unwrap_or(0),
        })
    }
}

impl ChannelStore for Database {
    fn find_channel_by_tuning_key(&self, key: &TuningKey) -> Result<Option<ChannelRecord>> {
        self.get_channel_by_tuning_key(key)
    }

    fn save_channel_grab_state(
        &self,
        channel_id: i64,
        last_grab_time: DateTime<Utc>,
        has_gaps: bool,
    ) -> Result<()> {
        self.update_channel_grab_state(channel_id, last_grab_time, has_gaps)
    }
}
