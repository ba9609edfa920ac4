use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{MySqlConnection, MySqlPool, Row};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::clock::OfficeClock;
use crate::domain::ledger::{
    AvailableBalances, Balances, Decision, LeaveAccount, LeaveError, check_reason, grant, leave_days,
    settle,
};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::leave_request::{
    LEAVE_COLUMNS, LeaveRequest, LeaveRequestEntry, LeaveStatus, LeaveType,
};
use crate::service::employee;

#[derive(Debug, Serialize, ToSchema)]
pub struct MyLeaves {
    pub history: Vec<LeaveRequest>,
    pub balances: AvailableBalances,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveHistory {
    pub history: Vec<LeaveRequest>,
}

#[derive(Debug, Clone)]
pub struct Application {
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

/// Loads and row-locks an employee's leave position.
async fn lock_account(conn: &mut MySqlConnection, employee_id: u64) -> Result<LeaveAccount, AppError> {
    let row = sqlx::query(
        r#"
        SELECT casual_leave_balance, earned_leave_balance, leaves_last_reset
        FROM employees
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(employee_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(LeaveAccount {
        stored: Balances {
            casual: row.try_get("casual_leave_balance")?,
            earned: row.try_get("earned_leave_balance")?,
        },
        pending: pending_days(conn, employee_id).await?,
        last_reset: row.try_get("leaves_last_reset")?,
    })
}

/// Applies the annual casual leave reset when a new office year has started and
/// commits it on its own, so a refused operation afterwards cannot roll it back.
async fn commit_annual_reset(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<LeaveAccount, AppError> {
    let mut tx = pool.begin().await?;
    let mut account = lock_account(&mut *tx, employee_id).await?;

    if account.apply_annual_reset(now, clock) {
        sqlx::query(
            "UPDATE employees SET casual_leave_balance = ?, leaves_last_reset = ? WHERE id = ?",
        )
        .bind(account.stored.casual)
        .bind(account.last_reset)
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;
        info!(employee_id, casual = account.stored.casual, "Annual casual leave reset applied");
    }

    tx.commit().await?;
    Ok(account)
}

/// Days reserved by the employee's pending requests, per balanced pool.
async fn pending_days(conn: &mut MySqlConnection, employee_id: u64) -> Result<Balances, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT leave_type, CAST(COALESCE(SUM(days), 0) AS SIGNED) AS days
        FROM leave_requests
        WHERE employee_id = ? AND status = 'Pending'
        GROUP BY leave_type
        "#,
    )
    .bind(employee_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut pending = Balances::default();
    for row in rows {
        let leave_type: String = row.try_get("leave_type")?;
        let days: i64 = row.try_get("days")?;
        let days = i32::try_from(days).unwrap_or(i32::MAX);
        match leave_type.parse::<LeaveType>() {
            Ok(LeaveType::CL) => pending.casual = days,
            Ok(LeaveType::EL) => pending.earned = days,
            _ => {}
        }
    }
    Ok(pending)
}

async fn history_for(pool: &MySqlPool, employee_id: u64) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(employee_id)
        .fetch_all(pool)
        .await
}

/// Own history plus what can still be applied for.
pub async fn my_leaves(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    now: DateTime<Utc>,
) -> Result<MyLeaves, AppError> {
    let account = commit_annual_reset(pool, clock, employee_id, now).await?;

    Ok(MyLeaves {
        history: history_for(pool, employee_id).await?,
        balances: account.available_for_display(),
    })
}

/// Files a new pending request. Nothing is debited until approval.
pub async fn apply(
    pool: &MySqlPool,
    clock: &OfficeClock,
    employee_id: u64,
    application: &Application,
    now: DateTime<Utc>,
) -> Result<LeaveRequest, AppError> {
    let days = leave_days(application.from_date, application.to_date)?;
    let reason = check_reason(&application.reason)?.to_string();

    commit_annual_reset(pool, clock, employee_id, now).await?;

    // The employee row lock serializes concurrent applications of one employee,
    // so the pending sum cannot change between the check and the insert.
    let mut tx = pool.begin().await?;
    let account = lock_account(&mut *tx, employee_id).await?;

    if let Err(e) = account.check_application(application.leave_type, days) {
        debug!(employee_id, leave_type = %application.leave_type, days, "Leave application refused");
        return Err(e.into());
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO leave_requests (employee_id, leave_type, from_date, to_date, days, reason, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(application.leave_type.as_ref())
    .bind(application.from_date)
    .bind(application.to_date)
    .bind(days)
    .bind(&reason)
    .bind(LeaveStatus::Pending.as_ref())
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(employee_id, leave_type = %application.leave_type, days, "Leave applied");

    Ok(LeaveRequest {
        id: inserted.last_insert_id(),
        employee_id,
        leave_type: application.leave_type,
        from_date: application.from_date,
        to_date: application.to_date,
        days,
        reason,
        status: LeaveStatus::Pending,
        created_at: now,
    })
}

/// Approves or rejects a pending request.
///
/// A due annual reset is committed first. The decision then runs in one
/// transaction: the request and the employee row are locked, the
/// debit is a compare-and-swap on the balances just read, and the status change
/// only applies while the request is still pending.
pub async fn decide(
    pool: &MySqlPool,
    clock: &OfficeClock,
    leave_id: u64,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<LeaveRequest, AppError> {
    let owner = sqlx::query_scalar::<_, u64>("SELECT employee_id FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool)
        .await?
        .ok_or(LeaveError::NotFound)?;
    commit_annual_reset(pool, clock, owner, now).await?;

    let mut tx = pool.begin().await?;

    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ? FOR UPDATE");
    let mut request = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LeaveError::NotFound)?;

    let account = lock_account(&mut *tx, request.employee_id).await?;
    let settlement = settle(
        request.status,
        request.leave_type,
        request.days,
        account.stored,
        decision,
    )?;

    if let Some(next) = settlement.balances {
        let debited = sqlx::query(
            r#"
            UPDATE employees
            SET casual_leave_balance = ?, earned_leave_balance = ?
            WHERE id = ? AND casual_leave_balance = ? AND earned_leave_balance = ?
            "#,
        )
        .bind(next.casual)
        .bind(next.earned)
        .bind(request.employee_id)
        .bind(account.stored.casual)
        .bind(account.stored.earned)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            return Err(LeaveError::InsufficientStored {
                leave_type: request.leave_type,
            }
            .into());
        }
    }

    let updated = sqlx::query(
        "UPDATE leave_requests SET status = ? WHERE id = ? AND status = ?",
    )
    .bind(settlement.status.as_ref())
    .bind(leave_id)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(LeaveError::AlreadyProcessed.into());
    }

    tx.commit().await?;

    info!(
        leave_id,
        employee_id = request.employee_id,
        status = %settlement.status,
        "Leave request decided"
    );

    request.status = settlement.status;
    Ok(request)
}

pub async fn all_requests(pool: &MySqlPool) -> Result<Vec<LeaveRequestEntry>, AppError> {
    let entries = sqlx::query_as::<_, LeaveRequestEntry>(
        r#"
        SELECT l.id, l.employee_id, l.leave_type, l.from_date, l.to_date, l.days, l.reason,
               l.status, l.created_at, e.name AS employee_name, e.email AS employee_email
        FROM leave_requests l
        JOIN employees e ON e.id = l.employee_id
        ORDER BY l.created_at DESC, l.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn history(pool: &MySqlPool, employee_id: u64) -> Result<LeaveHistory, AppError> {
    Ok(LeaveHistory {
        history: history_for(pool, employee_id).await?,
    })
}

/// Manual adjustment by HR/Admin: absolute overwrite of balances and salary.
pub async fn grant_balance(
    pool: &MySqlPool,
    employee_id: u64,
    casual: Option<i32>,
    earned: Option<i32>,
    salary: Option<f64>,
) -> Result<Employee, AppError> {
    if salary.is_some_and(|s| s < 0.0) {
        return Err(AppError::bad_request("Salary cannot be negative"));
    }

    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        "SELECT casual_leave_balance, earned_leave_balance, salary FROM employees WHERE id = ? FOR UPDATE",
    )
    .bind(employee_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let stored = Balances {
        casual: row.try_get("casual_leave_balance")?,
        earned: row.try_get("earned_leave_balance")?,
    };
    let next = grant(stored, casual, earned)?;
    let salary = match salary {
        Some(s) => s,
        None => row.try_get("salary")?,
    };

    sqlx::query(
        r#"
        UPDATE employees
        SET casual_leave_balance = ?, earned_leave_balance = ?, salary = ?
        WHERE id = ?
        "#,
    )
    .bind(next.casual)
    .bind(next.earned)
    .bind(salary)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(employee_id, casual = next.casual, earned = next.earned, "Leave balances granted");

    employee::find_by_id(pool, employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
