//! Error types for listing decoding and validation.

use thiserror::Error;

/// Errors raised while decoding or validating a grabbed listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// The listing could not be decoded.
    #[error("Failed to decode listing: {0}")]
    DecodeError(String),

    /// A program does not start before it ends.
    #[error("Program {index} has an empty or inverted time range")]
    InvalidTimeRange { index: usize },

    /// A language text carries a star rating outside 0..=7. Reported by
    /// `IncomingListing::star_rating_issues`, never by validation.
    #[error("Program {index} has star rating {rating} (max: {max})")]
    StarRatingOutOfRange { index: usize, rating: i32, max: i32 },
}
