use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use std::collections::HashSet;

/// Business-hours clock: Mon-Fri within a fixed daily window, in a fixed
/// local timezone, with an optional holiday set contributing zero time.
///
/// `elapsed` walks the interval day by day and accumulates only the positive
/// intersection of each calendar day with the business window, so weekends
/// and holidays are skipped and cost is O(days) in the span length.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use doctrack_sla::BusinessCalendar;
///
/// let cal = BusinessCalendar::default();
/// // 2026-01-05 is a Monday; 09:00-11:30 Manila time is 01:00-03:30 UTC.
/// let start = Utc.with_ymd_and_hms(2026, 1, 5, 1, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 1, 5, 3, 30, 0).unwrap();
/// assert_eq!(cal.elapsed(start, end), Duration::minutes(150));
/// ```
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    zone: Tz,
    day_start: NaiveTime,
    day_end: NaiveTime,
    holidays: HashSet<NaiveDate>,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Manila)
    }
}

impl BusinessCalendar {
    /// Calendar with the standard 08:00-17:00 window in the given zone.
    pub fn new(zone: Tz) -> Self {
        Self {
            zone,
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            holidays: HashSet::new(),
        }
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays = holidays.into_iter().collect();
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Business time between `start` and `end`. Returns zero when
    /// `end <= start`; the result is never negative.
    pub fn elapsed(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
        if end <= start {
            return Duration::zero();
        }

        // All walking happens on naive local datetimes; Manila has no DST so
        // the conversion is unambiguous, and other zones only shift which
        // wall-clock hours count.
        let start_local = start.with_timezone(&self.zone).naive_local();
        let end_local = end.with_timezone(&self.zone).naive_local();

        let mut total = Duration::zero();
        let mut cursor = start_local;

        while cursor < end_local {
            let date = cursor.date();
            let Some(next_date) = date.succ_opt() else {
                break;
            };
            let next_day_start = next_date.and_time(self.day_start);

            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
                || self.holidays.contains(&date)
            {
                cursor = next_day_start;
                continue;
            }

            let day_open = date.and_time(self.day_start);
            let day_close = date.and_time(self.day_end);

            let from = cursor.max(day_open);
            let to = end_local.min(day_close);
            if to > from {
                total += to - from;
            }

            cursor = next_day_start;
        }

        total
    }
}
