use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::decode_text;
use super::employee::EmployeeRef;

pub const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, date, check_in, check_out, status, total_hours, note";

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
    Late,
    #[serde(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    OnLeave,
}

/// One employee's attendance for one office calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub total_hours: f64,
    pub note: String,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

impl<'r> FromRow<'r, MySqlRow> for AttendanceRecord {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            date: row.try_get("date")?,
            check_in: row.try_get("check_in")?,
            check_out: row.try_get("check_out")?,
            status: decode_text(row, "status")?,
            total_hours: row.try_get("total_hours")?,
            note: row.try_get("note")?,
        })
    }
}

/// Attendance record joined with the owning employee, for HR/Admin views.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLogEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee: EmployeeRef,
}

impl<'r> FromRow<'r, MySqlRow> for AttendanceLogEntry {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            record: AttendanceRecord::from_row(row)?,
            employee: EmployeeRef {
                id: row.try_get("employee_id")?,
                name: row.try_get("employee_name")?,
                email: row.try_get("employee_email")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_matches_stored_values() {
        assert_eq!(AttendanceStatus::HalfDay.as_ref(), "Half Day");
        assert_eq!("On Leave".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::OnLeave);
        assert_eq!(
            serde_json::to_value(AttendanceStatus::HalfDay).unwrap(),
            serde_json::json!("Half Day")
        );
    }

    #[test]
    fn record_serializes_presentation_field_names() {
        let check_in = "2026-03-02T04:05:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = AttendanceRecord {
            id: 7,
            employee_id: 3,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in,
            check_out: None,
            status: AttendanceStatus::Late,
            total_hours: 0.0,
            note: "Late by 20 min".into(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "Late");
        assert_eq!(value["note"], "Late by 20 min");
        assert_eq!(value["totalHours"], 0.0);
        assert!(value["checkOut"].is_null());
        assert!(value.get("checkIn").is_some());
    }
}
