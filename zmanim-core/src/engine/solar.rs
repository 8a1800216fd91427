//! Sunset and nightfall from the sun's elevation.
//!
//! Positions come from the NREL SPA implementation in `solar-positioning`;
//! event times are found by bisecting the afternoon for the moment the sun
//! drops through a given elevation.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use solar_positioning::{spa, time::DeltaT};

use crate::error::{ZmanimError, ZmanimResult};

/// Apparent elevation of the sun's center when its upper limb meets the horizon.
pub const SUNSET_ELEVATION: f64 = -0.2667;

/// Nightfall (tzeit hakochavim): three small stars visible.
pub const NIGHTFALL_ELEVATION: f64 = -8.5;

const STANDARD_PRESSURE_HPA: f64 = 1013.25;
const STANDARD_TEMPERATURE_C: f64 = 15.0;

/// Bisection steps over a twelve hour span; resolution is well under a second.
const SEARCH_STEPS: u32 = 20;

/// A point on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    pub tz: Tz,
}

impl Observer {
    /// Sunset on the civil date `date`, or `None` when the sun does not set
    /// (or never rises) that day.
    pub fn sunset(&self, date: NaiveDate) -> ZmanimResult<Option<DateTime<Utc>>> {
        self.descending_through(date, SUNSET_ELEVATION)
    }

    /// Nightfall on `date`, or `None` when the sun stays above 8.5° below the horizon.
    pub fn nightfall(&self, date: NaiveDate) -> ZmanimResult<Option<DateTime<Utc>>> {
        self.descending_through(date, NIGHTFALL_ELEVATION)
    }

    pub fn elevation(&self, instant: DateTime<Utc>) -> ZmanimResult<f64> {
        let delta_t = DeltaT::estimate_from_date(instant.year(), instant.month())
            .map_err(|e| ZmanimError::Computation(e.to_string()))?;

        let position = spa::solar_position(
            instant,
            self.latitude,
            self.longitude,
            0.0,
            delta_t,
            STANDARD_PRESSURE_HPA,
            STANDARD_TEMPERATURE_C,
        )
        .map_err(|e| ZmanimError::Computation(e.to_string()))?;

        Ok(position.elevation_angle())
    }

    /// First instant after solar noon on `date` where the elevation falls to `threshold`.
    fn descending_through(
        &self,
        date: NaiveDate,
        threshold: f64,
    ) -> ZmanimResult<Option<DateTime<Utc>>> {
        let mut high = self.solar_noon(date);
        let mut low = high + Duration::hours(12);

        if self.elevation(high)? <= threshold || self.elevation(low)? > threshold {
            return Ok(None);
        }

        for _ in 0..SEARCH_STEPS {
            let mid = high + (low - high) / 2;
            if self.elevation(mid)? > threshold {
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(Some(round_to_second(low)))
    }

    /// Approximate solar noon closest to local noon on `date`.
    ///
    /// Uses the mean sun (12:00 UTC shifted by longitude); the equation of
    /// time is well inside the search span.
    fn solar_noon(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_noon = self
            .tz
            .from_local_datetime(&date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc());

        let shift = Duration::seconds((self.longitude * 240.0).round() as i64);
        [-1, 0, 1]
            .into_iter()
            .map(|offset| {
                (date + Duration::days(offset))
                    .and_hms_opt(12, 0, 0)
                    .unwrap_or_default()
                    .and_utc()
                    - shift
            })
            .min_by_key(|noon| (*noon - local_noon).num_seconds().abs())
            .unwrap_or(local_noon)
    }
}

fn round_to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = i64::from(instant.timestamp_subsec_nanos());
    let truncated = instant - Duration::nanoseconds(nanos);
    if nanos >= 500_000_000 {
        truncated + Duration::seconds(1)
    } else {
        truncated
    }
}

/// Round to the nearest whole minute.
pub fn round_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    let instant = round_to_second(instant);
    let seconds = instant.timestamp().rem_euclid(60);
    let truncated = instant - Duration::seconds(seconds);
    if seconds >= 30 {
        truncated + Duration::minutes(1)
    } else {
        truncated
    }
}
