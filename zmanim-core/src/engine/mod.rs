//! Jewish calendar event computation.
//!
//! `EventSource` is the seam the feed pipeline depends on; `ZmanimEngine` is
//! the built-in implementation combining the Hebrew calendar, the weekly
//! portion schedule and solar times.

pub mod hebrew;
pub mod sedra;
pub mod solar;

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use tracing::debug;

use crate::constants::{DEFAULT_CANDLE_LIGHTING_MINS, SPECIAL_REGION_CANDLE_LIGHTING_MINS};
use crate::date_range::DateRange;
use crate::error::ZmanimResult;
use crate::event::{EventCategory, RawEvent};
use crate::location::ResolvedLocation;

use hebrew::{HebrewYear, HolyDays};
use sedra::Reading;
use solar::{Observer, round_to_minute};

/// Label on candle-lighting events.
pub const CANDLE_LIGHTING_LABEL: &str = "Candle lighting";
/// Label on Havdalah events.
pub const HAVDALAH_LABEL: &str = "Havdalah";

/// Last day of the Omer count.
const OMER_DAYS: i64 = 49;

/// Source of calendar events for a location.
pub trait EventSource {
    /// All events for `range`, in chronological order.
    fn compute_events(
        &self,
        location: &ResolvedLocation,
        range: &DateRange,
        options: &CalendarOptions,
    ) -> ZmanimResult<Vec<RawEvent>>;

    /// Sunset on a civil date at the location, `None` if the sun doesn't set.
    fn compute_sunset(
        &self,
        location: &ResolvedLocation,
        date: NaiveDate,
    ) -> ZmanimResult<Option<DateTime<Utc>>>;
}

/// What the event source should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOptions {
    pub candle_lighting: bool,
    /// Minutes before sunset
    pub candle_lighting_mins: i64,
    /// Minutes after sunset; `None` uses nightfall
    pub havdalah_mins: Option<i64>,
    /// Weekly Torah portion on each Shabbat
    pub sedrot: bool,
    pub omer: bool,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        CalendarOptions {
            candle_lighting: true,
            candle_lighting_mins: DEFAULT_CANDLE_LIGHTING_MINS,
            havdalah_mins: None,
            sedrot: false,
            omer: false,
        }
    }
}

impl CalendarOptions {
    /// Defaults for a location: Israel lights earlier.
    pub fn for_location(location: &ResolvedLocation) -> Self {
        CalendarOptions {
            candle_lighting_mins: if location.is_special_region {
                SPECIAL_REGION_CANDLE_LIGHTING_MINS
            } else {
                DEFAULT_CANDLE_LIGHTING_MINS
            },
            ..Default::default()
        }
    }
}

/// Built-in calendar engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZmanimEngine;

impl ZmanimEngine {
    pub fn new() -> Self {
        ZmanimEngine
    }

    /// Candle-lighting or Havdalah on the evening of `date`, if any.
    fn evening_event(
        &self,
        observer: &Observer,
        holy: &HolyDays,
        date: NaiveDate,
        options: &CalendarOptions,
    ) -> ZmanimResult<Option<RawEvent>> {
        let tomorrow = date + Duration::days(1);

        let event = match (holy.is_holy(date), holy.is_holy(tomorrow)) {
            (false, true) => observer
                .sunset(date)?
                .map(|sunset| sunset - Duration::minutes(options.candle_lighting_mins))
                .map(|at| (EventCategory::CandleLighting, CANDLE_LIGHTING_LABEL, at)),
            // No kindling on a festival for Shabbat after dark
            (true, true) if tomorrow.weekday() == Weekday::Sat => observer
                .sunset(date)?
                .map(|sunset| sunset - Duration::minutes(options.candle_lighting_mins))
                .map(|at| (EventCategory::CandleLighting, CANDLE_LIGHTING_LABEL, at)),
            (true, true) => observer
                .nightfall(date)?
                .map(|at| (EventCategory::CandleLighting, CANDLE_LIGHTING_LABEL, at)),
            (true, false) => {
                let end = match options.havdalah_mins {
                    Some(mins) => observer.sunset(date)?.map(|s| s + Duration::minutes(mins)),
                    None => observer.nightfall(date)?,
                };
                end.map(|at| (EventCategory::Havdalah, HAVDALAH_LABEL, at))
            }
            (false, false) => None,
        };

        Ok(event.map(|(category, label, at)| {
            RawEvent::timed(category, label, round_to_minute(at), date)
        }))
    }
}

impl EventSource for ZmanimEngine {
    fn compute_events(
        &self,
        location: &ResolvedLocation,
        range: &DateRange,
        options: &CalendarOptions,
    ) -> ZmanimResult<Vec<RawEvent>> {
        let dates: Vec<NaiveDate> = range.local_dates(location.tz).collect();
        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };

        let israel = location.is_special_region;
        let observer = observer_for(location);
        let holy = HolyDays::between(first, last + Duration::days(1), israel);
        let portions = if options.sedrot {
            weekly_portions(first, last, israel)?
        } else {
            BTreeMap::new()
        };

        let mut events = Vec::new();
        for date in dates {
            if let Some(name) = holy.festival(date) {
                events.push(RawEvent::all_day(EventCategory::Other, name, date));
            }
            if let Some(reading) = portions.get(&date) {
                events.push(RawEvent::all_day(
                    EventCategory::Parasha,
                    format!("Parashat {}", reading.name()),
                    date,
                ));
            }
            if options.omer
                && let Some(label) = omer_label(date)
            {
                events.push(RawEvent::all_day(EventCategory::Other, label, date));
            }
            if options.candle_lighting {
                events.extend(self.evening_event(&observer, &holy, date, options)?);
            }
        }

        debug!(
            location = %location.display_name,
            count = events.len(),
            from = %first,
            to = %last,
            "Computed calendar events"
        );

        Ok(events)
    }

    fn compute_sunset(
        &self,
        location: &ResolvedLocation,
        date: NaiveDate,
    ) -> ZmanimResult<Option<DateTime<Utc>>> {
        observer_for(location).sunset(date)
    }
}

fn observer_for(location: &ResolvedLocation) -> Observer {
    Observer {
        latitude: location.latitude,
        longitude: location.longitude,
        tz: location.tz,
    }
}

/// Readings for every Shabbat between `first` and `last`.
fn weekly_portions(
    first: NaiveDate,
    last: NaiveDate,
    israel: bool,
) -> ZmanimResult<BTreeMap<NaiveDate, Reading>> {
    let mut year = HebrewYear::containing(first);
    let end = HebrewYear::containing(last);
    let mut portions = BTreeMap::new();

    while year.year <= end.year {
        for (date, reading) in sedra::schedule(&year, israel)? {
            if date >= first && date <= last {
                portions.insert(date, reading);
            }
        }
        year = year.next();
    }

    Ok(portions)
}

/// "12th day of the Omer" from 16 Nisan to 5 Sivan.
fn omer_label(date: NaiveDate) -> Option<String> {
    let day = (date - HebrewYear::containing(date).pesach()).num_days();
    (1..=OMER_DAYS)
        .contains(&day)
        .then(|| format!("{}{} day of the Omer", day, ordinal_suffix(day)))
}

fn ordinal_suffix(n: i64) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
