//! EPG reconciliation.
//!
//! One call to [`EpgUpdater::update_epg_for_channel`] handles one grabbed
//! listing:
//!
//! 1. [`ChannelGate`] finds the stored channel and decides whether the grab
//!    is wanted at all.
//! 2. [`ProgramReconciler`] purges ended programs, asks [`HoleDetector`] for
//!    gaps in what is stored, and merges the listing program by program.
//! 3. Subscribers are told about the imported listing.
//!
//! Configuration is read once into a [`ConfigSnapshot`] and never changes
//! during a pass.

pub mod config;
pub mod gate;
pub mod holes;
pub mod reconciler;
pub mod template;

use chrono::{DateTime, Utc};
use epg_protocol::IncomingListing;
use log::info;
use thiserror::Error;

pub use config::ConfigSnapshot;
pub use gate::{ChannelGate, GateDecision, GateRejection};
pub use holes::{Hole, HoleDetector, HoleSet};
pub use reconciler::{ImportSummary, ProgramReconciler};
pub use template::{RenderedProgram, TemplateRenderer};

use crate::database::DatabaseError;
use crate::events::EpgEvents;
use crate::store::{EpgStore, SettingsSource};

/// Errors that end a pass.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Failed to save grab state of channel {channel_id}: {source}")]
    SaveChannel {
        channel_id: i64,
        #[source]
        source: DatabaseError,
    },
}

/// What happened to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Rejected(GateRejection),
    Imported(ImportSummary),
}

/// Imports grabbed listings for one grabber.
#[derive(Debug, Clone)]
pub struct EpgUpdater {
    grabber_name: String,
    config: ConfigSnapshot,
    check_for_last_update: bool,
}

impl EpgUpdater {
    /// `check_for_last_update` enables the regrab interval check. It is
    /// ignored in always-replace mode.
    pub fn new(
        grabber_name: impl Into<String>,
        config: ConfigSnapshot,
        check_for_last_update: bool,
    ) -> Self {
        let check_for_last_update = check_for_last_update && !config.always_replace;
        Self {
            grabber_name: grabber_name.into(),
            config,
            check_for_last_update,
        }
    }

    /// Snapshot the settings and create an updater.
    pub fn from_settings<S: SettingsSource + ?Sized>(
        grabber_name: impl Into<String>,
        settings: &S,
        check_for_last_update: bool,
    ) -> Result<Self, UpdateError> {
        let config = ConfigSnapshot::load(settings)?;
        Ok(Self::new(grabber_name, config, check_for_last_update))
    }

    pub fn grabber_name(&self) -> &str {
        &self.grabber_name
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn check_for_last_update(&self) -> bool {
        self.check_for_last_update
    }

    /// Import one listing.
    ///
    /// Store writes done before an error are kept.
    pub fn update_epg_for_channel<S, E>(
        &self,
        store: &S,
        events: &E,
        listing: &IncomingListing,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, UpdateError>
    where
        S: EpgStore + ?Sized,
        E: EpgEvents + ?Sized,
    {
        let gate = ChannelGate::new(&self.config, self.check_for_last_update, &self.grabber_name);
        let channel = match gate.admit(store, listing, now)? {
            GateDecision::Admit(channel) => channel,
            GateDecision::Reject(reason) => return Ok(UpdateOutcome::Rejected(reason)),
        };

        info!(
            "{}: updating {} with {} programs",
            self.grabber_name,
            channel.display_name,
            listing.programs.len()
        );

        let reconciler = ProgramReconciler::new(store, &self.config, &self.grabber_name);
        let summary = reconciler.run(&channel, &listing.programs, now)?;

        events.on_import_epg_programs(listing);

        Ok(UpdateOutcome::Imported(summary))
    }
}
