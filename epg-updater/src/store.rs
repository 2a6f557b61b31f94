//! Collaborator seams consumed by the updater.
//!
//! The reconciliation core never talks to SQLite directly. It reads and
//! writes through these traits, which [`Database`](crate::database::Database)
//! implements. Implementations must serialize read-then-write access per
//! channel; the updater performs no optimistic concurrency checks of its own.

use chrono::{DateTime, Utc};
use epg_protocol::TuningKey;
use std::collections::HashMap;

use crate::database::{ChannelRecord, NewProgram, ProgramRecord, Result};

/// Channel lookup and grab-state persistence.
pub trait ChannelStore {
    /// Resolve a channel by exact match on its tuning identity.
    fn find_channel_by_tuning_key(&self, key: &TuningKey) -> Result<Option<ChannelRecord>>;

    /// Persist the outcome of a grab pass.
    fn save_channel_grab_state(
        &self,
        channel_id: i64,
        last_grab_time: DateTime<Utc>,
        has_gaps: bool,
    ) -> Result<()>;
}

/// Program schedule access.
pub trait ProgramStore {
    /// Remove programs of the channel that ended before `now`.
    fn delete_old_programs(&self, channel_id: i64, now: DateTime<Utc>) -> Result<usize>;

    /// Programs of the channel that have not ended by `since`, ascending by start.
    fn get_programs(&self, channel_id: i64, since: DateTime<Utc>) -> Result<Vec<ProgramRecord>>;

    /// Start time of the newest stored program of the channel.
    fn get_newest_program_start(&self, channel_id: i64) -> Result<Option<DateTime<Utc>>>;

    /// Programs occupying exactly `[start, end]`, in insertion order.
    fn find_programs_exact(
        &self,
        channel_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramRecord>>;

    fn insert_program(&self, program: &NewProgram) -> Result<i64>;

    fn update_program(&self, program: &ProgramRecord) -> Result<()>;

    fn delete_program(&self, program_id: i64) -> Result<()>;
}

/// Maps a free-text genre to a category id.
pub trait CategoryResolver {
    /// `None` for an empty genre.
    fn resolve_category(&self, genre: &str) -> Result<Option<i64>>;
}

/// String-valued settings keyed by name.
pub trait SettingsSource {
    fn get_setting(&self, name: &str) -> Result<Option<String>>;
}

impl SettingsSource for HashMap<String, String> {
    fn get_setting(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name).cloned())
    }
}

/// Everything the updater needs from the schedule store.
pub trait EpgStore: ChannelStore + ProgramStore + CategoryResolver {}

impl<T: ChannelStore + ProgramStore + CategoryResolver> EpgStore for T {}
