use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, Row, mysql::MySqlRow};
use utoipa::ToSchema;

use super::decode_text;
use super::role::{EmployeeStatus, Role};

/// Column list matching [`Employee`]'s `FromRow` implementation.
pub const EMPLOYEE_COLUMNS: &str = "id, name, email, password_hash, role, status, joining_date, \
     salary, phone_number, address, emergency_contact, casual_leave_balance, \
     earned_leave_balance, leaves_last_reset";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "Asha Rao",
        "email": "asha@company.com",
        "role": "EMPLOYEE",
        "status": "ACTIVE",
        "joiningDate": "2024-01-01",
        "salary": 45000.0,
        "phoneNumber": "+919800000000",
        "address": "Pune",
        "emergencyContact": "Ravi Rao",
        "casualLeaveBalance": 1,
        "earnedLeaveBalance": 4,
        "leavesLastReset": "2026-01-02T04:00:00Z"
    })
)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: EmployeeStatus,
    #[schema(value_type = String, format = "date")]
    pub joining_date: NaiveDate,
    pub salary: f64,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: String,
    pub casual_leave_balance: i32,
    pub earned_leave_balance: i32,
    #[schema(value_type = String, format = "date-time")]
    pub leaves_last_reset: DateTime<Utc>,
}

impl<'r> FromRow<'r, MySqlRow> for Employee {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: decode_text(row, "role")?,
            status: decode_text(row, "status")?,
            joining_date: row.try_get("joining_date")?,
            salary: row.try_get("salary")?,
            phone_number: row.try_get("phone_number")?,
            address: row.try_get("address")?,
            emergency_contact: row.try_get("emergency_contact")?,
            casual_leave_balance: row.try_get("casual_leave_balance")?,
            earned_leave_balance: row.try_get("earned_leave_balance")?,
            leaves_last_reset: row.try_get("leaves_last_reset")?,
        })
    }
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Name and email of the employee a record belongs to, for HR listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeRef {
    pub id: u64,
    pub name: String,
    pub email: String,
}
