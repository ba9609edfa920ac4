use chrono::{DateTime, Utc};

use super::clock::OfficeClock;
use super::office_config::OfficeConfig;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Check-outs before 14:30 office time count as a half day.
pub const EARLY_EXIT_MINUTE_OF_DAY: i64 = 14 * 60 + 30;
pub const EARLY_EXIT_NOTE: &str = "Early exit before 14:30";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceError {
    #[error("Already checked in for today.")]
    AlreadyCheckedIn,
    #[error("No check-in record found for today.")]
    NoCheckIn,
    #[error("Already checked out for today.")]
    AlreadyCheckedOut,
    #[error("Check-out cannot be before check-in.")]
    CheckOutBeforeCheckIn,
    #[error("Attendance record not found")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckInOutcome {
    pub status: AttendanceStatus,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutOutcome {
    pub status: AttendanceStatus,
    pub note: String,
    pub total_hours: f64,
}

/// Minutes between office start and `instant` on the instant's own office day.
/// Early arrivals are negative.
pub fn lateness_minutes(clock: &OfficeClock, config: &OfficeConfig, instant: DateTime<Utc>) -> i64 {
    clock.minute_of_day(instant) - super::clock::minute_of_day(config.start_time)
}

pub fn status_for_lateness(config: &OfficeConfig, lateness: i64) -> AttendanceStatus {
    if lateness > config.half_day_threshold_minutes {
        AttendanceStatus::HalfDay
    } else if lateness > config.grace_period_minutes {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

pub fn evaluate_check_in(
    clock: &OfficeClock,
    config: &OfficeConfig,
    instant: DateTime<Utc>,
) -> CheckInOutcome {
    let lateness = lateness_minutes(clock, config, instant);
    let status = status_for_lateness(config, lateness);
    let note = match status {
        AttendanceStatus::HalfDay => format!("Late by {} (Auto-marked)", format_lateness(lateness)),
        AttendanceStatus::Late => format!("Late by {}", format_lateness(lateness)),
        _ => String::new(),
    };

    CheckInOutcome { status, note }
}

/// Evaluates a check-out against the open record for today.
pub fn evaluate_check_out(
    clock: &OfficeClock,
    record: &AttendanceRecord,
    instant: DateTime<Utc>,
) -> Result<CheckOutOutcome, AttendanceError> {
    if !record.is_open() {
        return Err(AttendanceError::AlreadyCheckedOut);
    }

    let mut status = record.status;
    let mut note = record.note.clone();

    if clock.minute_of_day(instant) < EARLY_EXIT_MINUTE_OF_DAY && status != AttendanceStatus::Absent
    {
        status = AttendanceStatus::HalfDay;
        append_note(&mut note, EARLY_EXIT_NOTE, "; ");
    }

    Ok(CheckOutOutcome {
        status,
        note,
        total_hours: worked_hours(record.check_in, instant),
    })
}

/// `"H hr M min"` from an hour up, `"M min"` below.
pub fn format_lateness(minutes: i64) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h} hr {m} min")
    } else {
        format!("{m} min")
    }
}

/// Hours between two instants, rounded to two decimals.
pub fn worked_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let hours = (to - from).num_milliseconds() as f64 / 3_600_000.0;
    (hours * 100.0).round() / 100.0
}

pub(crate) fn append_note(note: &mut String, addition: &str, separator: &str) {
    if !note.is_empty() {
        note.push_str(separator);
    }
    note.push_str(addition);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock() -> OfficeClock {
        OfficeClock::utc()
    }

    fn at(hh: u32, mm: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
            .and_utc()
    }

    fn open_record(status: AttendanceStatus, note: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in: at(9, 30),
            check_out: None,
            status,
            total_hours: 0.0,
            note: note.into(),
        }
    }

    #[test]
    fn scenario_a_classification() {
        let config = OfficeConfig::default();

        let present = evaluate_check_in(&clock(), &config, at(9, 40));
        assert_eq!(present.status, AttendanceStatus::Present);
        assert_eq!(present.note, "");

        let late = evaluate_check_in(&clock(), &config, at(9, 50));
        assert_eq!(late.status, AttendanceStatus::Late);
        assert_eq!(late.note, "Late by 20 min");

        let half = evaluate_check_in(&clock(), &config, at(10, 5));
        assert_eq!(half.status, AttendanceStatus::HalfDay);
        assert_eq!(half.note, "Late by 35 min (Auto-marked)");
    }

    #[test]
    fn thresholds_are_inclusive_on_the_lenient_side() {
        let config = OfficeConfig::default();
        for minute in 0..=15 {
            let outcome = evaluate_check_in(&clock(), &config, at(9, 30 + minute));
            assert_eq!(outcome.status, AttendanceStatus::Present, "{minute} min late");
            assert!(outcome.note.is_empty());
        }
        for lateness in 16..=30 {
            assert_eq!(status_for_lateness(&config, lateness), AttendanceStatus::Late);
        }
        for lateness in [31, 60, 240] {
            assert_eq!(status_for_lateness(&config, lateness), AttendanceStatus::HalfDay);
        }
    }

    #[test]
    fn early_arrival_is_present() {
        let outcome = evaluate_check_in(&clock(), &OfficeConfig::default(), at(8, 0));
        assert_eq!(outcome.status, AttendanceStatus::Present);
        assert_eq!(outcome.note, "");
    }

    #[test]
    fn lateness_uses_office_wall_clock() {
        let ist = OfficeClock::new(chrono::FixedOffset::east_opt(19_800).unwrap());
        // 04:20 UTC is 09:50 IST.
        let outcome = evaluate_check_in(&ist, &OfficeConfig::default(), at(4, 20));
        assert_eq!(outcome.status, AttendanceStatus::Late);
        assert_eq!(outcome.note, "Late by 20 min");
    }

    #[test]
    fn lateness_formatting() {
        assert_eq!(format_lateness(0), "0 min");
        assert_eq!(format_lateness(59), "59 min");
        assert_eq!(format_lateness(60), "1 hr 0 min");
        assert_eq!(format_lateness(135), "2 hr 15 min");
    }

    #[test]
    fn scenario_b_early_exit_forces_half_day() {
        let record = open_record(AttendanceStatus::Present, "");
        let outcome = evaluate_check_out(&clock(), &record, at(13, 45)).unwrap();
        assert_eq!(outcome.status, AttendanceStatus::HalfDay);
        assert_eq!(outcome.note, "Early exit before 14:30");
        assert_eq!(outcome.total_hours, 4.25);
    }

    #[test]
    fn scenario_b_afternoon_exit_keeps_status() {
        let record = open_record(AttendanceStatus::Present, "");
        let outcome = evaluate_check_out(&clock(), &record, at(15, 0)).unwrap();
        assert_eq!(outcome.status, AttendanceStatus::Present);
        assert_eq!(outcome.note, "");
        assert_eq!(outcome.total_hours, 5.5);
    }

    #[test]
    fn early_exit_note_is_semicolon_joined() {
        let record = open_record(AttendanceStatus::Late, "Late by 20 min");
        let outcome = evaluate_check_out(&clock(), &record, at(14, 29)).unwrap();
        assert_eq!(outcome.status, AttendanceStatus::HalfDay);
        assert_eq!(outcome.note, "Late by 20 min; Early exit before 14:30");
    }

    #[test]
    fn early_exit_never_upgrades_absent() {
        let record = open_record(AttendanceStatus::Absent, "");
        let outcome = evaluate_check_out(&clock(), &record, at(12, 0)).unwrap();
        assert_eq!(outcome.status, AttendanceStatus::Absent);
        assert_eq!(outcome.note, "");
    }

    #[test]
    fn closed_record_cannot_check_out_again() {
        let mut record = open_record(AttendanceStatus::Present, "");
        record.check_out = Some(at(18, 0));
        assert_eq!(
            evaluate_check_out(&clock(), &record, at(19, 0)),
            Err(AttendanceError::AlreadyCheckedOut)
        );
    }

    #[test]
    fn worked_hours_rounds_to_two_decimals() {
        assert_eq!(worked_hours(at(9, 30), at(9, 50)), 0.33);
        assert_eq!(worked_hours(at(9, 0), at(17, 0)), 8.0);
    }
}
