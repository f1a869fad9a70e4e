//! Market-hours gate.
//!
//! A fixed New York window (06:00–18:00 inclusive) on weekdays, minus a
//! static list of exchange holidays. It is deliberately not
//! exchange-accurate: pre- and post-market are part of the window.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

/// NYSE full-day closures.
const HOLIDAYS: &[(i32, u32, u32)] = &[
    (2026, 1, 1),
    (2026, 1, 19),
    (2026, 2, 16),
    (2026, 4, 3),
    (2026, 5, 25),
    (2026, 6, 19),
    (2026, 7, 3),
    (2026, 9, 7),
    (2026, 11, 26),
    (2026, 12, 25),
    (2027, 1, 1),
    (2027, 1, 18),
    (2027, 2, 15),
    (2027, 3, 26),
    (2027, 5, 31),
    (2027, 6, 18),
    (2027, 7, 5),
    (2027, 9, 6),
    (2027, 11, 25),
    (2027, 12, 24),
];

#[derive(Clone, Debug)]
pub struct MarketCalendar {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    holidays: BTreeSet<NaiveDate>,
}

impl Default for MarketCalendar {
    fn default() -> Self {
        let holidays = HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();

        Self {
            tz: New_York,
            open: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            holidays,
        }
    }
}

impl MarketCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the holiday list, e.g. from configuration.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays = holidays.into_iter().collect();
        self
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn local(&self, at: DateTime<Utc>) -> DateTime<Tz> {
        at.with_timezone(&self.tz)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// True on a trading day between open and close, both ends inclusive.
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        let local = self.local(at);
        if !self.is_trading_day(local.date_naive()) {
            return false;
        }

        let t = local.time();
        self.open <= t && t <= self.close
    }

    /// The next moment the window opens, or `at` itself when already open.
    ///
    /// Looks two weeks ahead, which covers every holiday cluster in the list.
    pub fn next_open(&self, at: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let local = self.local(at);
        if self.is_open(at) {
            return Some(local);
        }

        (0..=14).find_map(|offset| {
            let date = local.date_naive() + Duration::days(offset);
            if !self.is_trading_day(date) {
                return None;
            }

            let candidate = self
                .tz
                .from_local_datetime(&date.and_time(self.open))
                .earliest()?;

            (candidate > local).then_some(candidate)
        })
    }
}
