//! EPG listing reconciliation.
//!
//! Takes listings produced by a tuner-side grabber and merges them into a
//! persistent program schedule without clobbering richer data that is
//! already stored.

pub mod config_file;
pub mod database;
pub mod events;
pub mod logging;
pub mod store;
pub mod updater;

pub use database::{Database, DatabaseError};
pub use events::{BroadcastEvents, EpgEvents, NoEvents};
pub use store::{CategoryResolver, ChannelStore, EpgStore, ProgramStore, SettingsSource};
pub use updater::{
    ConfigSnapshot, EpgUpdater, GateRejection, ImportSummary, UpdateError, UpdateOutcome,
};
