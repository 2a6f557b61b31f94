//! Decides whether a grabbed listing is stored at all.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use epg_protocol::IncomingListing;
use log::info;

use super::config::ConfigSnapshot;
use crate::database::{ChannelRecord, Result};
use crate::store::ChannelStore;

/// Why a listing was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateRejection {
    /// The listing contains no programs.
    NoPrograms,
    /// No stored channel has these tuning details.
    NoMatchingChannel,
    /// Only selected channels are grabbed and this one is not selected.
    NotEnabledForGrab,
    /// The channel was grabbed too recently.
    RegrabIntervalNotElapsed,
}

impl GateRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateRejection::NoPrograms => "no programs",
            GateRejection::NoMatchingChannel => "no matching channel",
            GateRejection::NotEnabledForGrab => "not enabled for grab",
            GateRejection::RegrabIntervalNotElapsed => "regrab interval not elapsed",
        }
    }
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the admission check.
#[derive(Debug, Clone)]
pub enum GateDecision {
    Admit(ChannelRecord),
    Reject(GateRejection),
}

/// Channel admission gate. Has no side effects.
#[derive(Debug, Clone, Copy)]
pub struct ChannelGate<'a> {
    config: &'a ConfigSnapshot,
    check_for_last_update: bool,
    grabber_name: &'a str,
}

impl<'a> ChannelGate<'a> {
    pub fn new(
        config: &'a ConfigSnapshot,
        check_for_last_update: bool,
        grabber_name: &'a str,
    ) -> Self {
        Self {
            config,
            check_for_last_update,
            grabber_name,
        }
    }

    /// Check a listing against the stored channels and the configuration.
    pub fn admit<S: ChannelStore + ?Sized>(
        &self,
        store: &S,
        listing: &IncomingListing,
        now: DateTime<Utc>,
    ) -> Result<GateDecision> {
        let key = listing.channel.tuning_key();

        if listing.programs.is_empty() {
            info!("{}: no epg infos found for channel {}", self.grabber_name, key);
            return Ok(GateDecision::Reject(GateRejection::NoPrograms));
        }

        let channel = match store.find_channel_by_tuning_key(&key)? {
            Some(channel) => channel,
            None => {
                info!("{}: no channel found for {}", self.grabber_name, key);
                return Ok(GateDecision::Reject(GateRejection::NoMatchingChannel));
            }
        };

        if self.config.store_only_selected(channel.media_type) && !channel.grab_epg {
            info!(
                "{}: channel {} is not configured to grab epg.",
                self.grabber_name, channel.display_name
            );
            return Ok(GateDecision::Reject(GateRejection::NotEnabledForGrab));
        }

        if self.check_for_last_update && !self.regrab_due(&channel, now) {
            info!(
                "{}: {} not needed lastUpdate:{:?}",
                self.grabber_name, channel.display_name, channel.last_grab_time
            );
            return Ok(GateDecision::Reject(GateRejection::RegrabIntervalNotElapsed));
        }

        Ok(GateDecision::Admit(channel))
    }

    /// A channel that was never grabbed is always due. An interval too large
    /// to represent never elapses.
    fn regrab_due(&self, channel: &ChannelRecord, now: DateTime<Utc>) -> bool {
        let last = match channel.last_grab_time {
            Some(last) => last,
            None => return true,
        };
        match Duration::try_minutes(self.config.regrab_after_minutes) {
            Some(interval) => now - last >= interval,
            None => false,
        }
    }
}
