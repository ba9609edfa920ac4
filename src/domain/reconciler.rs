//! Read-repair for attendance records left open past their day.
//!
//! An employee who forgets to check out leaves a record with no check-out. The
//! next time their history is read, every such record from an earlier day is
//! closed at the office close time and marked Absent, so a caller never sees a
//! session open for more than one calendar day. Closed records are left
//! untouched, which makes repeated runs a no-op.

use chrono::NaiveDate;

use super::classifier::{append_note, worked_hours};
use super::clock::OfficeClock;
use super::office_config::OfficeConfig;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

pub const AUTO_CLOSE_NOTE: &str = "[Auto-closed: Forgot Checkout]";

pub fn is_stale(record: &AttendanceRecord, today: NaiveDate) -> bool {
    record.is_open() && record.date != today
}

/// Closes `record` if it is stale. Returns whether anything changed.
pub fn close_if_stale(
    record: &mut AttendanceRecord,
    today: NaiveDate,
    clock: &OfficeClock,
    config: &OfficeConfig,
) -> bool {
    if !is_stale(record, today) {
        return false;
    }

    let check_in_day = clock.day_of(record.check_in);
    let assumed_check_out = clock.instant_at(check_in_day, config.close_time);

    record.check_out = Some(assumed_check_out);
    record.total_hours = worked_hours(record.check_in, assumed_check_out).max(0.0);
    record.status = AttendanceStatus::Absent;
    append_note(&mut record.note, AUTO_CLOSE_NOTE, " ");
    true
}

/// Applies [`close_if_stale`] to every record and returns the ones that changed.
pub fn reconcile<'a>(
    records: impl IntoIterator<Item = &'a mut AttendanceRecord>,
    today: NaiveDate,
    clock: &OfficeClock,
    config: &OfficeConfig,
) -> Vec<&'a AttendanceRecord> {
    records
        .into_iter()
        .filter_map(|record| {
            if close_if_stale(record, today, clock, config) {
                Some(&*record)
            } else {
                None
            }
        })
        .collect()
}
