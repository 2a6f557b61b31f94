//! Grabbed listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ListingError;
use crate::tuning::BroadcastChannel;

/// Highest star rating a grabber may report.
pub const MAX_STAR_RATING: i32 = 7;

/// Parental rating value meaning "not rated / unknown".
pub const UNKNOWN_PARENTAL_RATING: i32 = -1;

/// Media type of a stored channel.
///
/// TV and radio channels have independent "store only selected" toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Tv = 0,
    Radio = 1,
}

impl MediaType {
    /// Convert from the stored integer value. Unknown values are treated as TV.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => MediaType::Radio,
            _ => MediaType::Tv,
        }
    }

    pub fn name_en(&self) -> &'static str {
        match self {
            MediaType::Tv => "TV",
            MediaType::Radio => "Radio",
        }
    }
}

/// Text attributes of an event in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageText {
    /// ISO 639 language code as broadcast, or "all".
    pub language: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    /// 0 (unrated) to 7.
    #[serde(default)]
    pub star_rating: i32,
    #[serde(default)]
    pub classification: String,
    #[serde(default = "unknown_parental_rating")]
    pub parental_rating: i32,
}

fn unknown_parental_rating() -> i32 {
    UNKNOWN_PARENTAL_RATING
}

impl LanguageText {
    pub fn new(
        language: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            title: title.into(),
            description: description.into(),
            genre: String::new(),
            star_rating: 0,
            classification: String::new(),
            parental_rating: UNKNOWN_PARENTAL_RATING,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_star_rating(mut self, star_rating: i32) -> Self {
        self.star_rating = star_rating;
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }

    pub fn with_parental_rating(mut self, parental_rating: i32) -> Self {
        self.parental_rating = parental_rating;
        self
    }
}

/// A single grabbed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingProgram {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Texts in broadcast order.
    #[serde(default)]
    pub texts: Vec<LanguageText>,
}

impl IncomingProgram {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
            texts: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: LanguageText) -> Self {
        self.texts.push(text);
        self
    }

    /// True if both programs cover exactly the same time range.
    pub fn same_slot(&self, other: &IncomingProgram) -> bool {
        self.start_time == other.start_time && self.end_time == other.end_time
    }

    pub fn has_valid_range(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// One grab of a channel: where it came from and its events, ascending by
/// start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingListing {
    pub channel: BroadcastChannel,
    #[serde(default)]
    pub programs: Vec<IncomingProgram>,
}

impl IncomingListing {
    pub fn new(channel: BroadcastChannel, programs: Vec<IncomingProgram>) -> Self {
        Self { channel, programs }
    }

    /// Decode and validate a listing from JSON.
    pub fn from_json(json: &str) -> Result<Self, ListingError> {
        let listing: IncomingListing =
            serde_json::from_str(json).map_err(|e| ListingError::DecodeError(e.to_string()))?;
        listing.validate()?;
        Ok(listing)
    }

    /// Encode the listing as JSON.
    pub fn to_json(&self) -> Result<String, ListingError> {
        serde_json::to_string(self).map_err(|e| ListingError::DecodeError(e.to_string()))
    }

    /// Check every program starts before it ends.
    pub fn validate(&self) -> Result<(), ListingError> {
        match self.programs.iter().position(|p| !p.has_valid_range()) {
            Some(index) => Err(ListingError::InvalidTimeRange { index }),
            None => Ok(()),
        }
    }

    /// Star ratings outside 0..=7. These are stored as reported and render
    /// as an empty symbolic rating, so they do not fail validation.
    pub fn star_rating_issues(&self) -> Vec<ListingError> {
        self.programs
            .iter()
            .enumerate()
            .flat_map(|(index, program)| {
                program
                    .texts
                    .iter()
                    .filter(|text| !(0..=MAX_STAR_RATING).contains(&text.star_rating))
                    .map(move |text| ListingError::StarRatingOutOfRange {
                        index,
                        rating: text.star_rating,
                        max: MAX_STAR_RATING,
                    })
            })
            .collect()
    }
}
