//! ICS feed generation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::{ZmanimError, ZmanimResult};
use crate::event::{FeedTime, NormalizedEvent};

const UID_DOMAIN: &str = "zmanim-feed";

/// A calendar document under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub name: String,
    pub tzid: String,
    /// Stamped on every event as DTSTAMP, truncated to the minute
    pub generated_at: DateTime<Utc>,
}

impl Feed {
    pub fn new(name: impl Into<String>, tzid: impl Into<String>) -> Self {
        Feed {
            name: name.into(),
            tzid: tzid.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render `events` in the given order.
    pub fn build(&self, events: &[NormalizedEvent]) -> ZmanimResult<String> {
        if self.tzid.parse::<Tz>().is_err() {
            return Err(ZmanimError::IcsGenerate(format!(
                "unknown timezone {:?}",
                self.tzid
            )));
        }

        let dtstamp = truncate_to_minute(self.generated_at)
            .format("%Y%m%dT%H%M%SZ")
            .to_string();

        let mut cal = Calendar::new();
        cal.name(&self.name);
        cal.timezone(self.tzid.as_str());

        for event in events {
            let mut ics_event = icalendar::Event::new();
            ics_event.uid(&uid(event));
            ics_event.add_property("DTSTAMP", &dtstamp);
            ics_event.summary(&event.summary);

            match &event.time {
                FeedTime::Floating(local) => {
                    add_zoned_property(&mut ics_event, "DTSTART", local, &self.tzid);
                    add_zoned_property(&mut ics_event, "DTEND", local, &self.tzid);
                }
                FeedTime::AllDay(date) => {
                    add_date_property(&mut ics_event, "DTSTART", *date);
                    add_date_property(&mut ics_event, "DTEND", *date + Duration::days(1));
                }
            }

            if let Some(ref desc) = event.description {
                ics_event.description(desc);
            }

            cal.push(ics_event.done());
        }

        let cal = cal.done();
        Ok(strip_ics_bloat(&cal.to_string()))
    }
}

/// Build a feed stamped with the current time.
pub fn build_feed(events: &[NormalizedEvent], name: &str, tzid: &str) -> ZmanimResult<String> {
    Feed::new(name, tzid).build(events)
}

/// Stable per-event identifier: kind plus start, e.g. `shkiya-20240621T203110@zmanim-feed`.
fn uid(event: &NormalizedEvent) -> String {
    let stamp = match &event.time {
        FeedTime::Floating(local) => local.format("%Y%m%dT%H%M%S").to_string(),
        FeedTime::AllDay(date) => date.format("%Y%m%d").to_string(),
    };
    format!("{}-{}@{}", event.kind.as_str(), stamp, UID_DOMAIN)
}

fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(instant)
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:ZMANIM-FEED\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Wall-clock time in the feed timezone, e.g. `DTSTART;TZID=America/New_York:20240621T201300`
fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, local: &NaiveDateTime, tzid: &str) {
    let mut prop = Property::new(name, local.format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}
