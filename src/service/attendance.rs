use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::domain::classifier::{AttendanceError, evaluate_check_in, evaluate_check_out};
use crate::domain::clock::OfficeClock;
use crate::domain::manual_override::{OverrideRequest, apply_override};
use crate::domain::reconciler;
use crate::db::is_duplicate_key;
use crate::error::AppError;
use crate::model::attendance::{ATTENDANCE_COLUMNS, AttendanceLogEntry, AttendanceRecord};
use crate::service::settings;

/// Records returned by "my logs".
pub const MY_LOGS_LIMIT: i64 = 30;

async fn find_for_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?");
    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await
}

async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?");
    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Check-in for today. The (employee, date) unique key turns a racing second
/// check-in into the same "already checked in" rejection.
pub async fn check_in(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AppError> {
    let today = clock.day_of(now);

    if find_for_day(pool, employee_id, today).await?.is_some() {
        debug!(employee_id, %today, "Duplicate check-in rejected");
        return Err(AttendanceError::AlreadyCheckedIn.into());
    }

    let config = settings::resolve(pool).await?;
    let outcome = evaluate_check_in(clock, &config, now);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, status, total_hours, note)
        VALUES (?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(now)
    .bind(outcome.status.as_ref())
    .bind(&outcome.note)
    .execute(pool)
    .await;

    let inserted = match result {
        Ok(r) => r,
        Err(e) if is_duplicate_key(&e) => return Err(AttendanceError::AlreadyCheckedIn.into()),
        Err(e) => return Err(e.into()),
    };

    info!(employee_id, status = %outcome.status, "Checked in");

    Ok(AttendanceRecord {
        id: inserted.last_insert_id(),
        employee_id,
        date: today,
        check_in: now,
        check_out: None,
        status: outcome.status,
        total_hours: 0.0,
        note: outcome.note,
    })
}

pub async fn check_out(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AppError> {
    let today = clock.day_of(now);

    let mut record = find_for_day(pool, employee_id, today)
        .await?
        .ok_or(AttendanceError::NoCheckIn)?;

    let outcome = evaluate_check_out(clock, &record, now)?;

    // `check_out IS NULL` keeps two racing check-outs from both writing.
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, total_hours = ?, status = ?, note = ?
        WHERE id = ? AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(outcome.total_hours)
    .bind(outcome.status.as_ref())
    .bind(&outcome.note)
    .bind(record.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AttendanceError::AlreadyCheckedOut.into());
    }

    info!(employee_id, status = %outcome.status, hours = outcome.total_hours, "Checked out");

    record.check_out = Some(now);
    record.total_hours = outcome.total_hours;
    record.status = outcome.status;
    record.note = outcome.note;
    Ok(record)
}

/// Read-repair: closes every open record of `employee_id` from an earlier day.
/// Returns how many records were closed.
pub async fn reconcile_stale_sessions(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<usize, AppError> {
    let today = clock.day_of(now);

    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE employee_id = ? AND check_out IS NULL AND date <> ?"
    );
    let mut open = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .bind(today)
        .fetch_all(pool)
        .await?;

    if open.is_empty() {
        return Ok(0);
    }

    let config = settings::resolve(pool).await?;
    let mut closed = 0;

    for record in reconciler::reconcile(open.iter_mut(), today, clock, &config) {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, total_hours = ?, status = ?, note = ?
            WHERE id = ? AND check_out IS NULL
            "#,
        )
        .bind(record.check_out)
        .bind(record.total_hours)
        .bind(record.status.as_ref())
        .bind(&record.note)
        .bind(record.id)
        .execute(pool)
        .await?;

        closed += result.rows_affected() as usize;
        info!(employee_id, record_id = record.id, date = %record.date, "Auto-closed stale session");
    }

    Ok(closed)
}

async fn logs_for(
    pool: &MySqlPool,
    employee_id: u64,
    limit: Option<i64>,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let mut sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE employee_id = ? ORDER BY date DESC, id DESC"
    );
    if limit.is_some() {
        sql.push_str(" LIMIT ?");
    }

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(employee_id);
    if let Some(limit) = limit {
        query = query.bind(limit);
    }
    query.fetch_all(pool).await
}

/// The caller's latest records, after stale sessions are closed.
pub async fn my_logs(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    reconcile_stale_sessions(pool, clock, employee_id, now).await?;
    Ok(logs_for(pool, employee_id, Some(MY_LOGS_LIMIT)).await?)
}

/// One employee's full history for HR/Admin, after stale sessions are closed.
pub async fn user_logs(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    reconcile_stale_sessions(pool, clock, employee_id, now).await?;
    Ok(logs_for(pool, employee_id, None).await?)
}

/// Every record with its employee, after every employee's stale sessions are closed.
pub async fn all_logs(
    pool: &MySqlPool,
    clock: &OfficeClock,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceLogEntry>, AppError> {
    let today = clock.day_of(now);

    let stale_owners = sqlx::query_scalar::<_, u64>(
        "SELECT DISTINCT employee_id FROM attendance WHERE check_out IS NULL AND date <> ?",
    )
    .bind(today)
    .fetch_all(pool)
    .await?;

    for employee_id in stale_owners {
        reconcile_stale_sessions(pool, clock, employee_id, now).await?;
    }

    let logs = sqlx::query_as::<_, AttendanceLogEntry>(
        r#"
        SELECT a.id, a.employee_id, a.date, a.check_in, a.check_out, a.status, a.total_hours,
               a.note, e.name AS employee_name, e.email AS employee_email
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        ORDER BY a.date DESC, a.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// HR/Admin edit of an existing record.
pub async fn manual_update(
    pool: &MySqlPool,
    clock: &OfficeClock,
    record_id: u64,
    request: &OverrideRequest,
) -> Result<AttendanceRecord, AppError> {
    let mut record = find_by_id(pool, record_id)
        .await?
        .ok_or(AttendanceError::NotFound)?;

    let config = settings::resolve(pool).await?;
    apply_override(&mut record, request, clock, &config)?;

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_in = ?, check_out = ?, total_hours = ?, status = ?, note = ?
        WHERE id = ?
        "#,
    )
    .bind(record.check_in)
    .bind(record.check_out)
    .bind(record.total_hours)
    .bind(record.status.as_ref())
    .bind(&record.note)
    .bind(record.id)
    .execute(pool)
    .await?;

    info!(record_id, status = %record.status, "Attendance record manually updated");
    Ok(record)
}
