//! Database model definitions.

use chrono::{DateTime, Utc};
use epg_protocol::{MediaType, TuningKey};
use serde::Serialize;
use std::fmt;
use std::ops::BitOr;

/// Channel record from database.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelRecord {
    pub id: i64,
    pub display_name: String,
    pub media_type: MediaType,
    // EPG grab state
    pub grab_epg: bool,
    pub epg_has_gaps: bool,
    pub last_grab_time: Option<DateTime<Utc>>,
    // Metadata
    pub created_at: i64,
}

/// Tuning detail attached to a channel.
#[derive(Debug, Clone, Serialize)]
pub struct TuningDetailRecord {
    pub id: i64,
    pub channel_id: i64,
    pub standard: String,
    pub key: TuningKey,
}

/// Recording/notification state of a stored program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ProgramState(u32);

impl ProgramState {
    pub const NONE: ProgramState = ProgramState(0);
    pub const NOTIFY: ProgramState = ProgramState(1 << 0);
    pub const RECORD_ONCE: ProgramState = ProgramState(1 << 1);
    pub const RECORD_SERIES: ProgramState = ProgramState(1 << 2);
    pub const RECORD_MANUAL: ProgramState = ProgramState(1 << 3);
    pub const CONFLICT: ProgramState = ProgramState(1 << 4);
    pub const RECORD_ONCE_PENDING: ProgramState = ProgramState(1 << 5);
    pub const RECORD_SERIES_PENDING: ProgramState = ProgramState(1 << 6);
    pub const PARTIAL_RECORD_SERIES_PENDING: ProgramState = ProgramState(1 << 7);

    const PENDING: ProgramState = ProgramState(
        Self::CONFLICT.0
            | Self::RECORD_ONCE_PENDING.0
            | Self::RECORD_SERIES_PENDING.0
            | Self::PARTIAL_RECORD_SERIES_PENDING.0,
    );

    pub fn from_bits(bits: u32) -> Self {
        ProgramState(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: ProgramState) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn remove(&mut self, other: ProgramState) {
        self.0 &= !other.0;
    }

    /// Drop pending-recording and conflict markers; the scheduler recomputes
    /// them once the program's identity or time has been refreshed.
    pub fn clear_record_pending(&mut self) {
        self.remove(Self::PENDING);
    }
}

impl BitOr for ProgramState {
    type Output = ProgramState;

    fn bitor(self, rhs: ProgramState) -> ProgramState {
        ProgramState(self.0 | rhs.0)
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Program record from database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramRecord {
    pub id: i64,
    pub channel_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub star_rating: i32,
    pub classification: String,
    pub parental_rating: i32,
    pub state: ProgramState,
}

/// New program to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgram {
    pub channel_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub star_rating: i32,
    pub classification: String,
    pub parental_rating: i32,
    pub state: ProgramState,
}

/// New channel to insert.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub display_name: String,
    pub media_type: MediaType,
    pub grab_epg: bool,
}

impl NewChannel {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            media_type: MediaType::Tv,
            grab_epg: true,
        }
    }

    pub fn radio(mut self) -> Self {
        self.media_type = MediaType::Radio;
        self
    }

    pub fn with_grab_epg(mut self, grab_epg: bool) -> Self {
        self.grab_epg = grab_epg;
        self
    }
}
