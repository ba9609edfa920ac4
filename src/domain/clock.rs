use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};

/// Converts between stored UTC instants and the office's wall clock.
///
/// Every "which day is it" and "what time is it" question goes through here so
/// the calendar key of an attendance record and the lateness arithmetic always
/// agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeClock {
    offset: FixedOffset,
}

impl OfficeClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Office calendar day the instant falls on.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date_naive()
    }

    pub fn time_of_day(&self, instant: DateTime<Utc>) -> NaiveTime {
        self.local(instant).time()
    }

    /// Whole minutes since local midnight; seconds are dropped.
    pub fn minute_of_day(&self, instant: DateTime<Utc>) -> i64 {
        minute_of_day(self.time_of_day(instant))
    }

    pub fn year_of(&self, instant: DateTime<Utc>) -> i32 {
        self.local(instant).year()
    }

    /// The instant at which the office wall clock shows `time` on `day`.
    pub fn instant_at(&self, day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = day.and_time(time);
        let utc = local - chrono::Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Parses `+05:30`, `-04:00`, `+0530` or `Z` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
