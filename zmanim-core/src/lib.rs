//! Core library for zmanim-feed.
//!
//! Turns a location (postal code or coordinates) into an iCalendar feed of
//! candle-lighting, sunset and Havdallah times:
//! - `location` resolves query input into a `ResolvedLocation`
//! - `engine` computes raw calendar events (the `EventSource` seam)
//! - `normalize` classifies raw events into feed entries with wall-clock times
//! - `ics` serializes the entries into a calendar document

pub mod config;
pub mod constants;
pub mod date_range;
pub mod engine;
pub mod error;
pub mod event;
pub mod ics;
pub mod location;
pub mod normalize;

pub use date_range::DateRange;
pub use engine::{CalendarOptions, EventSource, ZmanimEngine};
pub use error::{ZmanimError, ZmanimResult};
pub use event::{EventCategory, EventKind, FeedTime, NormalizedEvent, RawEvent};
pub use ics::{Feed, build_feed};
pub use location::{LocationQuery, LocationResolver, ResolvedLocation};
pub use normalize::normalize;
