//! iCalendar feed generation.
//!
//! Serializes normalized events into a single RFC 5545 document.

mod generate;

pub use generate::{Feed, build_feed};
