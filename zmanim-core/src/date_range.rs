//! Date window for event computation.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::constants::{WINDOW_FUTURE_MONTHS, WINDOW_PAST_DAYS};

/// Half-open range of instants `[from, to)` handed to the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        DateRange { from, to }
    }

    /// Sliding feed window: five days back, one calendar year ahead of `now`.
    ///
    /// A day that doesn't exist in the target month rolls over into the next,
    /// so a window opened on Feb 29 ends on Mar 1.
    pub fn feed_window(now: DateTime<Utc>) -> Self {
        let from = now - Duration::days(WINDOW_PAST_DAYS);
        let to = match now.checked_add_months(Months::new(WINDOW_FUTURE_MONTHS)) {
            Some(clamped) => clamped + Duration::days(i64::from(now.day() - clamped.day())),
            None => now + Duration::days(365),
        };

        DateRange { from, to }
    }

    /// Civil dates covered by the range as seen in `tz`, first to last inclusive.
    pub fn local_dates(&self, tz: Tz) -> impl Iterator<Item = NaiveDate> {
        let first = self.from.with_timezone(&tz).date_naive();
        let last = self.to.with_timezone(&tz).date_naive();
        first.iter_days().take_while(move |d| *d <= last)
    }
}
