//! Gaps in the stored schedule that a grab may fill.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::config::ConfigSnapshot;
use crate::database::{ChannelRecord, ProgramRecord, Result};
use crate::store::ProgramStore;

/// Minimum distance between two stored programs for a hole to exist.
pub const MIN_GAP_SECS: i64 = 300;

pub(crate) fn min_gap() -> Duration {
    Duration::seconds(MIN_GAP_SECS)
}

/// A bounded gap between two stored programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hole {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Hole {
    /// True if `[start, end]` lies entirely inside the hole.
    pub fn fits(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Holes of one channel, ascending by start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoleSet {
    holes: Vec<Hole>,
}

impl HoleSet {
    pub fn new(holes: Vec<Hole>) -> Self {
        Self { holes }
    }

    /// Scan programs sorted ascending by start.
    pub fn from_programs(programs: &[ProgramRecord]) -> Self {
        let holes = programs
            .windows(2)
            .filter(|pair| pair[1].start_time - pair[0].end_time > min_gap())
            .map(|pair| Hole {
                start: pair[0].end_time,
                end: pair[1].start_time,
            })
            .collect();
        Self { holes }
    }

    pub fn fits_in_any_hole(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.holes.iter().any(|hole| hole.fits(start, end))
    }

    pub fn len(&self) -> usize {
        self.holes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hole> {
        self.holes.iter()
    }
}

/// Whether the stored schedule of a channel is worth scanning for holes.
pub fn should_scan(epg_has_gaps: bool, config: &ConfigSnapshot) -> bool {
    (epg_has_gaps || config.always_fill_holes) && !config.always_replace
}

pub struct HoleDetector;

impl HoleDetector {
    /// Holes in the not yet ended part of the channel's schedule. Empty when
    /// scanning is not enabled for the channel.
    pub fn detect<S: ProgramStore + ?Sized>(
        store: &S,
        channel: &ChannelRecord,
        config: &ConfigSnapshot,
        now: DateTime<Utc>,
    ) -> Result<HoleSet> {
        if !should_scan(channel.epg_has_gaps, config) {
            return Ok(HoleSet::default());
        }

        let programs = store.get_programs(channel.id, now)?;
        let holes = HoleSet::from_programs(&programs);
        for hole in holes.iter() {
            debug!(
                "HoleDetector: channel {} hole {} - {}",
                channel.display_name, hole.start, hole.end
            );
        }
        Ok(holes)
    }
}
