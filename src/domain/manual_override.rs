use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};

use super::classifier::{AttendanceError, lateness_minutes, status_for_lateness, worked_hours};
use super::clock::OfficeClock;
use super::office_config::OfficeConfig;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Status requested by an HR/Admin edit: a fixed value, or `"Auto"` to recompute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChoice {
    Auto,
    Explicit(AttendanceStatus),
}

impl<'de> Deserialize<'de> for StatusChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "Auto" {
            return Ok(StatusChoice::Auto);
        }
        raw.parse::<AttendanceStatus>()
            .map(StatusChoice::Explicit)
            .map_err(|_| serde::de::Error::custom(format!("unknown attendance status: {raw}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRequest {
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
    pub status: StatusChoice,
    pub note: String,
}

/// Applies an HR/Admin edit to `record` in place.
///
/// New times are placed on the record's own office day. With `Auto` the status
/// is re-derived from the new check-in time only; the early-exit rule is not
/// re-applied. When no new check-out is given the existing one is kept.
pub fn apply_override(
    record: &mut AttendanceRecord,
    request: &OverrideRequest,
    clock: &OfficeClock,
    config: &OfficeConfig,
) -> Result<(), AttendanceError> {
    let check_in = clock.instant_at(record.date, request.check_in);
    let check_out = match request.check_out {
        Some(time) => Some(clock.instant_at(record.date, time)),
        None => record.check_out,
    };
    if let Some(out) = check_out {
        if out < check_in {
            return Err(AttendanceError::CheckOutBeforeCheckIn);
        }
    }

    record.status = match request.status {
        StatusChoice::Auto => status_for_lateness(config, lateness_minutes(clock, config, check_in)),
        StatusChoice::Explicit(status) => status,
    };
    record.check_in = check_in;
    record.check_out = check_out;
    record.total_hours = check_out.map_or(0.0, |out| worked_hours(check_in, out));
    record.note = request.note.trim().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

    fn ist() -> OfficeClock {
        OfficeClock::new(FixedOffset::east_opt(19_800).unwrap())
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn record() -> AttendanceRecord {
        AttendanceRecord {
            id: 4,
            employee_id: 2,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in: "2026-03-02T05:00:00Z".parse().unwrap(),
            check_out: Some("2026-03-02T08:00:00Z".parse().unwrap()),
            status: AttendanceStatus::HalfDay,
            total_hours: 3.0,
            note: "Late by 1 hr 0 min (Auto-marked); Early exit before 14:30".into(),
        }
    }

    fn request(check_in: NaiveTime, check_out: Option<NaiveTime>, status: StatusChoice) -> OverrideRequest {
        OverrideRequest {
            check_in,
            check_out,
            status,
            note: "Badge reader fault".into(),
        }
    }

    #[test]
    fn auto_recomputes_from_edited_check_in() {
        let mut r = record();
        let req = request(time(9, 35), Some(time(11, 0)), StatusChoice::Auto);
        apply_override(&mut r, &req, &ist(), &OfficeConfig::default()).unwrap();

        // 09:35 is within grace; the 11:00 exit does not trigger the early-exit rule here.
        assert_eq!(r.status, AttendanceStatus::Present);
        assert_eq!(r.check_in, "2026-03-02T04:05:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(r.check_out, Some("2026-03-02T05:30:00Z".parse::<DateTime<Utc>>().unwrap()));
        assert_eq!(r.total_hours, 1.42);
        assert_eq!(r.note, "Badge reader fault");
    }

    #[test]
    fn auto_marks_late_and_half_day() {
        let config = OfficeConfig::default();
        let mut r = record();
        apply_override(&mut r, &request(time(9, 50), None, StatusChoice::Auto), &ist(), &config).unwrap();
        assert_eq!(r.status, AttendanceStatus::Late);

        apply_override(&mut r, &request(time(10, 5), None, StatusChoice::Auto), &ist(), &config).unwrap();
        assert_eq!(r.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn explicit_status_is_stored_verbatim() {
        let mut r = record();
        let req = request(time(12, 0), None, StatusChoice::Explicit(AttendanceStatus::OnLeave));
        apply_override(&mut r, &req, &ist(), &OfficeConfig::default()).unwrap();
        assert_eq!(r.status, AttendanceStatus::OnLeave);
    }

    #[test]
    fn missing_check_out_keeps_existing_one() {
        let mut r = record();
        let before = r.check_out;
        apply_override(&mut r, &request(time(9, 0), None, StatusChoice::Auto), &ist(), &OfficeConfig::default()).unwrap();
        assert_eq!(r.check_out, before);
        assert_eq!(r.total_hours, 4.5);
    }

    #[test]
    fn check_out_before_check_in_is_rejected_without_changes() {
        let mut r = record();
        let snapshot = r.clone();
        let req = request(time(14, 0), Some(time(9, 0)), StatusChoice::Auto);
        assert_eq!(
            apply_override(&mut r, &req, &ist(), &OfficeConfig::default()),
            Err(AttendanceError::CheckOutBeforeCheckIn)
        );
        assert_eq!(r, snapshot);
    }

    #[test]
    fn status_choice_parses_auto_and_labels() {
        let auto: StatusChoice = serde_json::from_str("\"Auto\"").unwrap();
        assert_eq!(auto, StatusChoice::Auto);
        let half: StatusChoice = serde_json::from_str("\"Half Day\"").unwrap();
        assert_eq!(half, StatusChoice::Explicit(AttendanceStatus::HalfDay));
        assert!(serde_json::from_str::<StatusChoice>("\"Sick\"").is_err());
    }
}
