use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, mysql::MySqlRow};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::decode_text;
use super::employee::EmployeeRef;

pub const LEAVE_COLUMNS: &str =
    "id, employee_id, leave_type, from_date, to_date, days, reason, status, created_at";

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
pub enum LeaveType {
    /// Casual leave
    CL,
    /// Earned leave
    EL,
    /// Unpaid leave, no balance attached
    UL,
}

impl LeaveType {
    /// Leave types that draw down a stored balance.
    pub fn is_balanced(&self) -> bool {
        matches!(self, LeaveType::CL | LeaveType::EL)
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            LeaveType::CL => "Casual Leave",
            LeaveType::EL => "Earned Leave",
            LeaveType::UL => "Unpaid Leave",
        }
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = 2)]
    pub days: i32,
    #[schema(example = "Family function")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, MySqlRow> for LeaveRequest {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            leave_type: decode_text(row, "leave_type")?,
            from_date: row.try_get("from_date")?,
            to_date: row.try_get("to_date")?,
            days: row.try_get("days")?,
            reason: row.try_get("reason")?,
            status: decode_text(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Leave request joined with the requesting employee.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestEntry {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub employee: EmployeeRef,
}

impl<'r> FromRow<'r, MySqlRow> for LeaveRequestEntry {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            request: LeaveRequest::from_row(row)?,
            employee: EmployeeRef {
                id: row.try_get("employee_id")?,
                name: row.try_get("employee_name")?,
                email: row.try_get("employee_email")?,
            },
        })
    }
}
