//! Hebrew calendar arithmetic and festival dates.
//!
//! Years are placed with the molad of Tishrei and the four postponement rules;
//! everything else (festivals, 9 Av) is a fixed offset from a Rosh Hashana.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// R.D. (days since 0001-01-01 proleptic Gregorian, day 1) of 1 Tishrei AM 1.
const HEBREW_EPOCH_RD: i64 = -1_373_427;

const PARTS_PER_DAY: i64 = 25_920;

/// First day of Pesach always falls this many days before the next Rosh Hashana.
const PESACH_BEFORE_NEW_YEAR: i64 = 163;

/// 15 Nisan to 6 Sivan.
const PESACH_TO_SHAVUOT: i64 = 50;

/// 15 Nisan to 9 Av.
const PESACH_TO_TISHA_BAV: i64 = 112;

/// A festival day with Sabbath-like observance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Festival {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// A Hebrew year, running from its Rosh Hashana to the day before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HebrewYear {
    pub year: i64,
    rosh_hashana: NaiveDate,
    next_rosh_hashana: NaiveDate,
}

impl HebrewYear {
    pub fn new(year: i64) -> Self {
        HebrewYear {
            year,
            rosh_hashana: date_from_rd(new_year_rd(year)),
            next_rosh_hashana: date_from_rd(new_year_rd(year + 1)),
        }
    }

    /// The Hebrew year a civil date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        let rd = i64::from(date.num_days_from_ce());
        let mut year = ((rd - HEBREW_EPOCH_RD) as f64 / 365.2468).floor() as i64 + 1;

        while new_year_rd(year + 1) <= rd {
            year += 1;
        }
        while new_year_rd(year) > rd {
            year -= 1;
        }

        Self::new(year)
    }

    pub fn next(&self) -> Self {
        Self::new(self.year + 1)
    }

    pub fn is_leap(&self) -> bool {
        is_leap_year(self.year)
    }

    pub fn length(&self) -> i64 {
        (self.next_rosh_hashana - self.rosh_hashana).num_days()
    }

    pub fn rosh_hashana(&self) -> NaiveDate {
        self.rosh_hashana
    }

    /// 1 Tishrei of the following year.
    pub fn next_rosh_hashana(&self) -> NaiveDate {
        self.next_rosh_hashana
    }

    /// `n` days after 1 Tishrei (0 is Rosh Hashana itself).
    pub fn tishrei(&self, n: i64) -> NaiveDate {
        self.rosh_hashana + Duration::days(n)
    }

    /// 15 Nisan.
    pub fn pesach(&self) -> NaiveDate {
        self.next_rosh_hashana - Duration::days(PESACH_BEFORE_NEW_YEAR)
    }

    /// 6 Sivan.
    pub fn shavuot(&self) -> NaiveDate {
        self.pesach() + Duration::days(PESACH_TO_SHAVUOT)
    }

    /// 9 Av.
    pub fn tisha_bav(&self) -> NaiveDate {
        self.pesach() + Duration::days(PESACH_TO_TISHA_BAV)
    }

    /// Yom tov days of this year. Outside Israel the second days are added.
    pub fn festivals(&self, israel: bool) -> Vec<Festival> {
        let pesach = self.pesach();
        let shavuot = self.shavuot();
        let day = |base: NaiveDate, offset: i64, name: &'static str| Festival {
            date: base + Duration::days(offset),
            name,
        };

        let mut festivals = vec![
            day(self.rosh_hashana, 0, "Rosh Hashana I"),
            day(self.rosh_hashana, 1, "Rosh Hashana II"),
            day(self.rosh_hashana, 9, "Yom Kippur"),
            day(self.rosh_hashana, 14, "Sukkot I"),
            day(self.rosh_hashana, 21, "Shmini Atzeret"),
            day(pesach, 0, "Pesach I"),
            day(pesach, 6, "Pesach VII"),
            day(shavuot, 0, "Shavuot I"),
        ];

        if !israel {
            festivals.extend([
                day(self.rosh_hashana, 15, "Sukkot II"),
                day(self.rosh_hashana, 22, "Simchat Torah"),
                day(pesach, 1, "Pesach II"),
                day(pesach, 7, "Pesach VIII"),
                day(shavuot, 1, "Shavuot II"),
            ]);
        }

        festivals.sort_by_key(|f| f.date);
        festivals
    }

    /// Last day of Sukkot including Shmini Atzeret (and Simchat Torah abroad).
    pub fn sukkot_end(&self, israel: bool) -> NaiveDate {
        self.tishrei(if israel { 21 } else { 22 })
    }

    /// Last day of Pesach.
    pub fn pesach_end(&self, israel: bool) -> NaiveDate {
        self.pesach() + Duration::days(if israel { 6 } else { 7 })
    }

    /// Whether a Shabbat on `date` takes a festival reading instead of the weekly portion.
    pub fn is_festival_shabbat(&self, date: NaiveDate, israel: bool) -> bool {
        let shavuot_end = self.shavuot() + Duration::days(if israel { 0 } else { 1 });

        date == self.tishrei(0)
            || date == self.tishrei(1)
            || date == self.tishrei(9)
            || (date >= self.tishrei(14) && date <= self.sukkot_end(israel))
            || (date >= self.pesach() && date <= self.pesach_end(israel))
            || (date >= self.shavuot() && date <= shavuot_end)
    }
}

/// Festival days and Shabbatot over a span of civil dates.
#[derive(Debug, Clone, Default)]
pub struct HolyDays {
    festivals: BTreeMap<NaiveDate, &'static str>,
}

impl HolyDays {
    /// Covers every Hebrew year touching `first..=last`.
    pub fn between(first: NaiveDate, last: NaiveDate, israel: bool) -> Self {
        let mut year = HebrewYear::containing(first);
        let end = HebrewYear::containing(last);
        let mut festivals = BTreeMap::new();

        loop {
            for festival in year.festivals(israel) {
                festivals.insert(festival.date, festival.name);
            }
            if year.year >= end.year {
                break;
            }
            year = year.next();
        }

        HolyDays { festivals }
    }

    pub fn festival(&self, date: NaiveDate) -> Option<&'static str> {
        self.festivals.get(&date).copied()
    }

    pub fn is_holy(&self, date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sat || self.festivals.contains_key(&date)
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (7 * year + 1).rem_euclid(19) < 7
}

/// Days from the epoch to the molad of Tishrei, with the "molad zaken"
/// and weekday postponements folded in.
fn elapsed_days(year: i64) -> i64 {
    let months = (235 * year - 234).div_euclid(19);
    let parts = 12_084 + 13_753 * months;
    let days = 29 * months + parts.div_euclid(PARTS_PER_DAY);

    if (3 * (days + 1)).rem_euclid(7) < 3 {
        days + 1
    } else {
        days
    }
}

/// Keeps year lengths inside the allowed set (353-355, 383-385 days).
fn year_length_correction(year: i64) -> i64 {
    let previous = elapsed_days(year - 1);
    let current = elapsed_days(year);
    let next = elapsed_days(year + 1);

    if next - current == 356 {
        2
    } else if current - previous == 382 {
        1
    } else {
        0
    }
}

fn new_year_rd(year: i64) -> i64 {
    HEBREW_EPOCH_RD + elapsed_days(year) + year_length_correction(year)
}

fn date_from_rd(rd: i64) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(rd as i32).unwrap_or(NaiveDate::MIN)
}
