//! Maps raw engine events to feed entries with wall-clock times.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::engine::EventSource;
use crate::event::{EventCategory, EventKind, FeedTime, NormalizedEvent, RawEvent};
use crate::location::ResolvedLocation;

pub const CANDLE_LIGHTING_SUMMARY: &str = "🕯️ Candle Lighting";
pub const SUNSET_SUMMARY: &str = "☀️ Shkiya";
pub const HAVDALAH_SUMMARY: &str = "✨ Havdallah";

/// Classify `raw` events in order. Candle-lighting is followed by that day's
/// sunset on the event's calendar date when the source can compute one;
/// unknown categories are dropped.
pub fn normalize<S>(source: &S, raw: &[RawEvent], location: &ResolvedLocation) -> Vec<NormalizedEvent>
where
    S: EventSource + ?Sized,
{
    let tz = location.tz;
    let mut events = Vec::with_capacity(raw.len() * 2);

    for event in raw {
        match event.category {
            EventCategory::CandleLighting => {
                let Some(instant) = event.instant else {
                    debug!(date = %event.date, "Candle lighting without a time, skipping");
                    continue;
                };
                events.push(timed(
                    EventKind::CandleLighting,
                    CANDLE_LIGHTING_SUMMARY,
                    format!("Candle Lighting at {}", clock_text(instant, tz)),
                    instant,
                    tz,
                ));

                let date = event.date;
                match source.compute_sunset(location, date) {
                    Ok(Some(sunset)) => events.push(timed(
                        EventKind::Sunset,
                        SUNSET_SUMMARY,
                        format!("Sunset (Shkiya) at {}", clock_text(sunset, tz)),
                        sunset,
                        tz,
                    )),
                    Ok(None) => debug!(%date, "No sunset at location"),
                    Err(e) => debug!(%date, error = %e, "Sunset lookup failed"),
                }
            }
            EventCategory::Havdalah => {
                let Some(instant) = event.instant else {
                    debug!(date = %event.date, "Havdalah without a time, skipping");
                    continue;
                };
                events.push(timed(
                    EventKind::Havdalah,
                    HAVDALAH_SUMMARY,
                    format!("Havdallah at {}", clock_text(instant, tz)),
                    instant,
                    tz,
                ));
            }
            EventCategory::Parasha => events.push(NormalizedEvent {
                kind: EventKind::Parasha,
                summary: event.description.clone(),
                description: None,
                time: FeedTime::AllDay(event.date),
            }),
            EventCategory::Other => {}
        }
    }

    events
}

/// The instant's wall-clock reading in `tz`, to the second, without an offset.
pub fn floating_time(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let local = instant.with_timezone(&tz).naive_local();
    local.with_nanosecond(0).unwrap_or(local)
}

/// 12-hour clock text, e.g. "7:42:00 PM".
pub fn clock_text(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%-I:%M:%S %p").to_string()
}

fn timed(
    kind: EventKind,
    summary: &str,
    description: String,
    instant: DateTime<Utc>,
    tz: Tz,
) -> NormalizedEvent {
    NormalizedEvent {
        kind,
        summary: summary.to_string(),
        description: Some(description),
        time: FeedTime::Floating(floating_time(instant, tz)),
    }
}
