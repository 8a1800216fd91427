//! Weekly Torah portion (parasha) schedule.
//!
//! Each Hebrew year's Shabbatot are split into segments between fixed
//! anchors (Pesach, Shavuot, 9 Av, Rosh Hashana). Within a segment the
//! portions are laid out in order and the minimum number of combinable
//! pairs is joined so that the segment fills exactly.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::hebrew::HebrewYear;
use crate::error::{ZmanimError, ZmanimResult};

pub const PARSHIYOT: [&str; 53] = [
    "Bereshit",
    "Noach",
    "Lech-Lecha",
    "Vayera",
    "Chayei Sara",
    "Toldot",
    "Vayetzei",
    "Vayishlach",
    "Vayeshev",
    "Miketz",
    "Vayigash",
    "Vayechi",
    "Shemot",
    "Vaera",
    "Bo",
    "Beshalach",
    "Yitro",
    "Mishpatim",
    "Terumah",
    "Tetzaveh",
    "Ki Tisa",
    "Vayakhel",
    "Pekudei",
    "Vayikra",
    "Tzav",
    "Shmini",
    "Tazria",
    "Metzora",
    "Achrei Mot",
    "Kedoshim",
    "Emor",
    "Behar",
    "Bechukotai",
    "Bamidbar",
    "Nasso",
    "Beha'alotcha",
    "Sh'lach",
    "Korach",
    "Chukat",
    "Balak",
    "Pinchas",
    "Matot",
    "Masei",
    "Devarim",
    "Vaetchanan",
    "Eikev",
    "Re'eh",
    "Shoftim",
    "Ki Teitzei",
    "Ki Tavo",
    "Nitzavim",
    "Vayeilech",
    "Ha'azinu",
];

// First portion of each pair that may be read together.
const VAYAKHEL: usize = 21;
const TZAV: usize = 24;
const TAZRIA: usize = 26;
const METZORA: usize = 27;
const ACHREI_MOT: usize = 28;
const BEHAR: usize = 31;
const BAMIDBAR: usize = 33;
const CHUKAT: usize = 38;
const MATOT: usize = 41;
const DEVARIM: usize = 43;
const NITZAVIM: usize = 50;
const VAYEILECH: usize = 51;
const HAAZINU: usize = 52;

/// One Shabbat's reading: a single portion or a combined pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub first: usize,
    pub combined: bool,
}

impl Reading {
    fn single(first: usize) -> Self {
        Reading { first, combined: false }
    }

    pub fn name(&self) -> String {
        if self.combined {
            format!("{}-{}", PARSHIYOT[self.first], PARSHIYOT[self.first + 1])
        } else {
            PARSHIYOT[self.first].to_string()
        }
    }
}

/// Shabbat readings for a Hebrew year, in date order.
pub fn schedule(year: &HebrewYear, israel: bool) -> ZmanimResult<Vec<(NaiveDate, Reading)>> {
    let mut readings = Vec::new();
    let pesach = year.pesach();
    let shavuot = year.shavuot();

    // Tishrei: Vayeilech only gets its own Shabbat when two are free before Sukkot ends
    let tishrei = tishrei_slots(year, israel);
    let opening = if tishrei.len() == 2 { VAYEILECH } else { HAAZINU };
    readings.extend(
        tishrei
            .iter()
            .zip(opening..=HAAZINU)
            .map(|(date, first)| (*date, Reading::single(first))),
    );

    // Bereshit up to the portion before Pesach: Tzav, or Metzora in a leap year
    let winter = shabbatot(year.sukkot_end(israel) + Duration::days(1), pesach);
    let mut before_pesach = if year.is_leap() { METZORA } else { TZAV };
    if winter.len() > before_pesach + 1 {
        before_pesach = winter.len() - 1;
    }
    let winter_pairs: &[usize] = if year.is_leap() { &[VAYAKHEL, TAZRIA] } else { &[VAYAKHEL] };
    readings.extend(fit(0, before_pesach + 1, &winter, winter_pairs)?);

    // Bamidbar falls on the Shabbat before Shavuot, and Devarim on or before 9 Av
    let bamidbar = last_shabbat_before(shavuot);
    let devarim = last_shabbat_before(year.tisha_bav() + Duration::days(1));

    let spring = shabbatot(year.pesach_end(israel) + Duration::days(1), bamidbar);
    let summer: Vec<NaiveDate> = shabbatot(bamidbar, devarim)
        .into_iter()
        .filter(|d| !year.is_festival_shabbat(*d, israel))
        .collect();
    let spring_pairs: Vec<usize> = [TAZRIA, ACHREI_MOT, BEHAR]
        .into_iter()
        .filter(|p| *p > before_pesach)
        .collect();

    match fit(before_pesach + 1, BAMIDBAR, &spring, &spring_pairs) {
        Ok(spring_readings) => {
            readings.extend(spring_readings);
            readings.extend(fit(BAMIDBAR, DEVARIM, &summer, &[MATOT, CHUKAT])?);
        }
        // Israel can run a week ahead after Pesach and only catch up in the summer
        Err(_) => {
            let slots: Vec<NaiveDate> = spring.into_iter().chain(summer).collect();
            let pairs: Vec<usize> = spring_pairs.into_iter().chain([MATOT, CHUKAT]).collect();
            readings.extend(fit(before_pesach + 1, DEVARIM, &slots, &pairs)?);
        }
    }

    // Devarim through Nitzavim always has exactly eight Shabbatot
    let next_tishrei = tishrei_slots(&year.next(), israel);
    let late_summer = shabbatot(devarim, year.next_rosh_hashana());
    let (last_portion, late_pairs) = if next_tishrei.len() == 1 {
        (VAYEILECH, &[NITZAVIM] as &[usize])
    } else {
        (NITZAVIM, &[] as &[usize])
    };
    readings.extend(fit(DEVARIM, last_portion + 1, &late_summer, late_pairs)?);

    Ok(readings)
}

/// Shabbatot between Rosh Hashana and the end of Sukkot that are not festival days.
fn tishrei_slots(year: &HebrewYear, israel: bool) -> Vec<NaiveDate> {
    shabbatot(year.rosh_hashana(), year.sukkot_end(israel) + Duration::days(1))
        .into_iter()
        .filter(|d| !year.is_festival_shabbat(*d, israel))
        .collect()
}

/// Lay out portions `from..to` over `slots`, combining the leading entries of
/// `pairs` until the counts match.
fn fit(
    from: usize,
    to: usize,
    slots: &[NaiveDate],
    pairs: &[usize],
) -> ZmanimResult<Vec<(NaiveDate, Reading)>> {
    let needed = (to - from)
        .checked_sub(slots.len())
        .filter(|n| *n <= pairs.len())
        .ok_or_else(|| {
            ZmanimError::Computation(format!(
                "cannot fit portions {}..{} into {} Shabbatot",
                PARSHIYOT[from],
                PARSHIYOT[to - 1],
                slots.len()
            ))
        })?;
    let combined = &pairs[..needed];

    let mut readings = Vec::with_capacity(slots.len());
    let mut next = from;
    for date in slots {
        let reading = Reading {
            first: next,
            combined: combined.contains(&next),
        };
        next += if reading.combined { 2 } else { 1 };
        readings.push((*date, reading));
    }

    Ok(readings)
}

/// Saturdays in `[from, to)`.
fn shabbatot(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let days_until = (Weekday::Sat.num_days_from_monday() + 7
        - from.weekday().num_days_from_monday())
        % 7;
    let first = from + Duration::days(i64::from(days_until));

    first
        .iter_weeks()
        .take_while(|d| *d < to)
        .collect()
}

/// The last Saturday strictly before `date`.
fn last_shabbat_before(date: NaiveDate) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7 - Weekday::Sat.num_days_from_monday())
        % 7;
    date - Duration::days(if back == 0 { 7 } else { i64::from(back) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reading_on(year: i64, israel: bool, date: NaiveDate) -> Option<String> {
        schedule(&HebrewYear::new(year), israel)
            .unwrap()
            .into_iter()
            .find(|(d, _)| *d == date)
            .map(|(_, r)| r.name())
    }

    #[test]
    fn test_every_year_fits() {
        for year in 5600..6000 {
            for israel in [false, true] {
                let readings = schedule(&HebrewYear::new(year), israel)
                    .unwrap_or_else(|e| panic!("{year} israel={israel}: {e}"));

                // Every portion from Bereshit to Nitzavim is read exactly once
                let mut covered: Vec<usize> = readings
                    .iter()
                    .flat_map(|(_, r)| {
                        if r.combined { vec![r.first, r.first + 1] } else { vec![r.first] }
                    })
                    .filter(|p| *p <= NITZAVIM)
                    .collect();
                covered.sort();
                assert_eq!(covered, (0..=NITZAVIM).collect::<Vec<_>>(), "{year} israel={israel}");
            }
        }
    }

    #[test]
    fn test_known_readings_5785() {
        assert_eq!(reading_on(5785, false, ymd(2024, 10, 5)).as_deref(), Some("Ha'azinu"));
        assert_eq!(reading_on(5785, false, ymd(2024, 10, 26)).as_deref(), Some("Bereshit"));
        assert_eq!(reading_on(5785, false, ymd(2024, 11, 2)).as_deref(), Some("Noach"));
    }

    #[test]
    fn test_spring_5784_leap_year() {
        assert_eq!(reading_on(5784, false, ymd(2024, 4, 20)).as_deref(), Some("Metzora"));
        assert_eq!(reading_on(5784, false, ymd(2024, 5, 4)).as_deref(), Some("Achrei Mot"));
        assert_eq!(reading_on(5784, false, ymd(2024, 6, 8)).as_deref(), Some("Bamidbar"));
        // Shabbat of Pesach has no weekly portion
        assert_eq!(reading_on(5784, false, ymd(2024, 4, 27)), None);
    }

    #[test]
    fn test_israel_runs_ahead_after_pesach_on_shabbat() {
        // Pesach 5779 began on Shabbat; the eighth day is only a festival abroad
        assert_eq!(reading_on(5779, true, ymd(2019, 4, 27)).as_deref(), Some("Achrei Mot"));
        assert_eq!(reading_on(5779, false, ymd(2019, 4, 27)), None);

        // Abroad catches up by combining Matot-Masei
        assert_eq!(reading_on(5779, true, ymd(2019, 8, 3)).as_deref(), Some("Masei"));
        assert_eq!(reading_on(5779, false, ymd(2019, 8, 3)).as_deref(), Some("Matot-Masei"));
        assert_eq!(reading_on(5779, true, ymd(2019, 8, 10)).as_deref(), Some("Devarim"));
        assert_eq!(reading_on(5779, false, ymd(2019, 8, 10)).as_deref(), Some("Devarim"));
    }

    #[test]
    fn test_israel_splits_behar_bechukotai() {
        assert_eq!(reading_on(5775, true, ymd(2015, 5, 9)).as_deref(), Some("Behar"));
        assert_eq!(reading_on(5775, false, ymd(2015, 5, 16)).as_deref(), Some("Behar-Bechukotai"));
        assert_eq!(reading_on(5775, true, ymd(2015, 5, 23)).as_deref(), Some("Bamidbar"));
        assert_eq!(reading_on(5775, false, ymd(2015, 5, 23)).as_deref(), Some("Bamidbar"));
    }

    #[test]
    fn test_last_shabbat_before() {
        // 2024-06-12 is a Wednesday
        assert_eq!(last_shabbat_before(ymd(2024, 6, 12)), ymd(2024, 6, 8));
        // a Saturday maps to the previous week
        assert_eq!(last_shabbat_before(ymd(2024, 6, 8)), ymd(2024, 6, 1));
    }

    #[test]
    fn test_shabbatot_half_open() {
        let days = shabbatot(ymd(2024, 6, 1), ymd(2024, 6, 15));
        assert_eq!(days, vec![ymd(2024, 6, 1), ymd(2024, 6, 8)]);
    }
}
