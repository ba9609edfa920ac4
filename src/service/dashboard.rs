use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::domain::clock::OfficeClock;
use crate::domain::ledger::AvailableBalances;
use crate::error::AppError;
use crate::model::attendance::AttendanceStatus;
use crate::model::leave_request::LeaveStatus;
use crate::service::{attendance, leave};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_employees: i64,
    pub present_today: i64,
    pub pending_leaves: i64,
    pub on_leave_today: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub balances: AvailableBalances,
    pub my_pending: i64,
    pub present_days: i64,
}

fn counts_as_present(status: AttendanceStatus) -> bool {
    status != AttendanceStatus::Absent
}

/// First day of the month containing `day`.
fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub async fn admin_stats(
    pool: &MySqlPool,
    clock: &OfficeClock,
    now: DateTime<Utc>,
) -> Result<AdminStats, AppError> {
    let today = clock.day_of(now);

    let total_employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;

    let present_today =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = ?")
            .bind(today)
            .fetch_one(pool)
            .await?;

    let pending_leaves =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leave_requests WHERE status = ?")
            .bind(LeaveStatus::Pending.as_ref())
            .fetch_one(pool)
            .await?;

    let on_leave_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE status = ? AND from_date <= ? AND to_date >= ?",
    )
    .bind(LeaveStatus::Approved.as_ref())
    .bind(today)
    .bind(today)
    .fetch_one(pool)
    .await?;

    Ok(AdminStats {
        total_employees,
        present_today,
        pending_leaves,
        on_leave_today,
    })
}

pub async fn employee_stats(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<EmployeeStats, AppError> {
    let today = clock.day_of(now);
    let balances = leave::my_leaves(pool, clock, employee_id, now).await?.balances;

    let my_pending = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leave_requests WHERE employee_id = ? AND status = ?",
    )
    .bind(employee_id)
    .bind(LeaveStatus::Pending.as_ref())
    .fetch_one(pool)
    .await?;

    // Forgotten check-outs must be closed as Absent before they are counted.
    attendance::reconcile_stale_sessions(pool, clock, employee_id, now).await?;

    let statuses = sqlx::query_scalar::<_, String>(
        "SELECT status FROM attendance WHERE employee_id = ? AND date >= ? AND date <= ?",
    )
    .bind(employee_id)
    .bind(month_start(today))
    .bind(today)
    .fetch_all(pool)
    .await?;

    let present_days = statuses
        .iter()
        .filter_map(|s| s.parse::<AttendanceStatus>().ok())
        .filter(|s| counts_as_present(*s))
        .count() as i64;

    Ok(EmployeeStats {
        balances,
        my_pending,
        present_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::office_config::OfficeConfig;
    use crate::domain::reconciler;
    use crate::model::attendance::AttendanceRecord;
    use chrono::FixedOffset;

    #[test]
    fn forgotten_checkout_stops_counting_once_reconciled() {
        let clock = OfficeClock::new(FixedOffset::east_opt(19_800).unwrap());
        let mut records = vec![
            AttendanceRecord {
                id: 1,
                employee_id: 4,
                date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                check_in: "2026-10-16T04:20:00Z".parse().unwrap(),
                check_out: None,
                status: AttendanceStatus::Late,
                total_hours: 0.0,
                note: String::new(),
            },
            AttendanceRecord {
                id: 2,
                employee_id: 4,
                date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
                check_in: "2026-10-17T03:55:00Z".parse().unwrap(),
                check_out: None,
                status: AttendanceStatus::Present,
                total_hours: 0.0,
                note: String::new(),
            },
        ];
        let present = |records: &[AttendanceRecord]| {
            records.iter().filter(|r| counts_as_present(r.status)).count()
        };
        assert_eq!(present(&records), 2);

        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        reconciler::reconcile(records.iter_mut(), today, &clock, &OfficeConfig::default());

        assert_eq!(records[0].status, AttendanceStatus::Absent);
        assert_eq!(present(&records), 1);
    }

    #[test]
    fn month_start_is_the_first() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(month_start(day), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
    }
}
