//! Event types flowing through the pipeline.
//!
//! `RawEvent` is what an event source produces (absolute instants),
//! `NormalizedEvent` is what the feed builder consumes (wall-clock times).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Category tag attached to every raw event by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    CandleLighting,
    Havdalah,
    Parasha,
    Other,
}

/// An event as produced by the calendar engine
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub category: EventCategory,
    /// Engine label, e.g. "Candle lighting" or "Parashat Noach"
    pub description: String,
    /// Absolute time for timed categories (candle-lighting, havdalah)
    pub instant: Option<DateTime<Utc>>,
    /// Civil date of the event at the location
    pub date: NaiveDate,
}

impl RawEvent {
    pub fn timed(
        category: EventCategory,
        description: impl Into<String>,
        instant: DateTime<Utc>,
        date: NaiveDate,
    ) -> Self {
        RawEvent {
            category,
            description: description.into(),
            instant: Some(instant),
            date,
        }
    }

    pub fn all_day(category: EventCategory, description: impl Into<String>, date: NaiveDate) -> Self {
        RawEvent {
            category,
            description: description.into(),
            instant: None,
            date,
        }
    }
}

/// What a feed entry represents. Used for stable UIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CandleLighting,
    Sunset,
    Havdalah,
    Parasha,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::CandleLighting => "candle-lighting",
            EventKind::Sunset => "shkiya",
            EventKind::Havdalah => "havdallah",
            EventKind::Parasha => "parasha",
        }
    }
}

/// Start of a feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedTime {
    /// Wall-clock time in the feed's declared timezone (no offset)
    Floating(NaiveDateTime),
    /// Whole civil date
    AllDay(NaiveDate),
}

/// A feed entry ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    pub summary: String,
    pub description: Option<String>,
    pub time: FeedTime,
}
