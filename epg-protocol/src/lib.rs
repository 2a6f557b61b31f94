//! Listing types exchanged between EPG grabbers and the EPG updater.
//!
//! A grabber tunes a service, collects its event information and hands one
//! [`IncomingListing`] per channel to the updater. The listing identifies the
//! channel by its broadcast-standard specific tuning parameters
//! ([`BroadcastChannel`]), which normalize to a [`TuningKey`] used to find the
//! stored channel.
//!
//! # Example
//!
//! ```rust
//! use epg_protocol::{BroadcastChannel, IncomingListing, IncomingProgram, LanguageText};
//! use chrono::{TimeZone, Utc};
//!
//! let channel = BroadcastChannel::isdb(0x7FE8, 0x7FE8, 1024);
//! let start = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 4, 1, 10, 30, 0).unwrap();
//!
//! let mut program = IncomingProgram::new(start, end);
//! program.texts.push(LanguageText::new("jpn", "News", "Morning news"));
//!
//! let listing = IncomingListing::new(channel, vec![program]);
//! assert!(listing.validate().is_ok());
//! assert_eq!(listing.channel.tuning_key().service_id, 1024);
//! ```

pub mod error;
pub mod tuning;
pub mod types;

pub use error::ListingError;
pub use tuning::{BroadcastChannel, TuningKey};
pub use types::{
    IncomingListing, IncomingProgram, LanguageText, MediaType, MAX_STAR_RATING,
    UNKNOWN_PARENTAL_RATING,
};
