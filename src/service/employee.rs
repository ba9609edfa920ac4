use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::auth::password::hash_password;
use crate::domain::ledger::ANNUAL_CASUAL_LEAVE;
use crate::db::is_duplicate_key;
use crate::error::AppError;
use crate::model::employee::{EMPLOYEE_COLUMNS, Employee};
use crate::model::role::Role;
use crate::utils::db_utils::{FieldKind, UpdatableField, build_update_sql, execute_update};
use crate::utils::email_index;

const ROLES: &[&str] = &["ADMIN", "HR", "EMPLOYEE"];
const STATUSES: &[&str] = &["ACTIVE", "INACTIVE"];

/// Keys HR/Admin may change through `PUT /employee/{id}`.
const UPDATABLE: &[UpdatableField] = &[
    UpdatableField { key: "name", column: "name", kind: FieldKind::Text },
    UpdatableField { key: "email", column: "email", kind: FieldKind::Email },
    UpdatableField { key: "password", column: "password_hash", kind: FieldKind::Text },
    UpdatableField { key: "role", column: "role", kind: FieldKind::OneOf(ROLES) },
    UpdatableField { key: "status", column: "status", kind: FieldKind::OneOf(STATUSES) },
    UpdatableField { key: "joiningDate", column: "joining_date", kind: FieldKind::Date },
    UpdatableField { key: "salary", column: "salary", kind: FieldKind::NonNegativeNumber },
    UpdatableField { key: "phoneNumber", column: "phone_number", kind: FieldKind::OptionalText },
    UpdatableField { key: "address", column: "address", kind: FieldKind::OptionalText },
    UpdatableField { key: "emergencyContact", column: "emergency_contact", kind: FieldKind::OptionalText },
    UpdatableField { key: "casualLeaveBalance", column: "casual_leave_balance", kind: FieldKind::NonNegativeInt },
    UpdatableField { key: "earnedLeaveBalance", column: "earned_leave_balance", kind: FieldKind::NonNegativeInt },
];

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@company.com", format = "email")]
    pub email: String,
    #[schema(example = "changeme")]
    pub password: String,
    pub role: Option<Role>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub joining_date: Option<NaiveDate>,
    #[schema(example = 45000.0)]
    pub salary: Option<f64>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeePage {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

pub async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?");
    sqlx::query_as::<_, Employee>(&sql)
        .bind(email_index::normalize(email))
        .fetch_optional(pool)
        .await
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AppError::Internal("password hashing failed".into())
    })
}

/// Registers a new employee with a fresh leave account.
pub async fn create(
    pool: &MySqlPool,
    new: &NewEmployee,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Employee, AppError> {
    let name = new.name.trim();
    let email = email_index::normalize(&new.email);

    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }
    if new.password.is_empty() {
        return Err(AppError::bad_request("Password is required"));
    }
    if new.salary.is_some_and(|s| s < 0.0) {
        return Err(AppError::bad_request("Salary cannot be negative"));
    }

    if !email_index::is_email_available(&email, pool).await? {
        debug!(%email, "Registration rejected, email taken");
        return Err(AppError::bad_request("User already exists"));
    }

    let password_hash = hash(&new.password)?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (name, email, password_hash, role, status, joining_date, salary, phone_number,
             address, emergency_contact, casual_leave_balance, earned_leave_balance, leaves_last_reset)
        VALUES (?, ?, ?, ?, 'ACTIVE', ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(name)
    .bind(&email)
    .bind(&password_hash)
    .bind(new.role.unwrap_or(Role::Employee).as_ref())
    .bind(new.joining_date.unwrap_or(today))
    .bind(new.salary.unwrap_or(0.0))
    .bind(new.phone_number.as_deref().unwrap_or("").trim())
    .bind(new.address.as_deref().unwrap_or("").trim())
    .bind(new.emergency_contact.as_deref().unwrap_or("").trim())
    .bind(ANNUAL_CASUAL_LEAVE)
    .bind(now)
    .execute(pool)
    .await;

    let inserted = match result {
        Ok(r) => r,
        Err(e) if is_duplicate_key(&e) => return Err(AppError::bad_request("User already exists")),
        Err(e) => return Err(e.into()),
    };

    email_index::mark_taken(&email).await;

    let id = inserted.last_insert_id();
    info!(employee_id = id, %email, "Employee registered");

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("employee {id} vanished after insert")))
}

/// Paginated directory listing with optional status, role and text filters.
pub async fn list(pool: &MySqlPool, query: &EmployeeQuery) -> Result<EmployeePage, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(status.trim().to_uppercase());
    }

    if let Some(role) = &query.role {
        conditions.push("role = ?");
        bindings.push(role.trim().to_uppercase());
    }

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        conditions.push("(name LIKE ? OR email LIKE ?)");
        let like = format!("%{search}%");
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {where_clause}");
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees {where_clause} ORDER BY id DESC LIMIT ? OFFSET ?"
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    let data = data_query
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

    Ok(EmployeePage {
        data,
        page,
        per_page,
        total,
    })
}

/// Partial update from a JSON object. A new password is hashed before it is stored.
pub async fn update(
    pool: &MySqlPool,
    employee_id: u64,
    mut payload: Map<String, Value>,
) -> Result<Employee, AppError> {
    if let Some(raw) = payload.get("password") {
        let password = raw
            .as_str()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::bad_request("Invalid value for 'password'"))?;
        let hashed = hash(password)?;
        payload.insert("password".into(), Value::String(hashed));
    }

    let new_email = payload
        .get("email")
        .and_then(Value::as_str)
        .map(email_index::normalize);

    let current = find_by_id(pool, employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    if let Some(email) = &new_email {
        if *email != current.email && !email_index::is_email_available(email, pool).await? {
            return Err(AppError::bad_request("User already exists"));
        }
    }

    let update = build_update_sql("employees", &payload, UPDATABLE, "id", employee_id)?;

    match execute_update(pool, update).await {
        Ok(_) => {}
        Err(e) if is_duplicate_key(&e) => return Err(AppError::bad_request("User already exists")),
        Err(e) => return Err(e.into()),
    }

    if let Some(email) = new_email.as_ref().filter(|e| **e != current.email) {
        email_index::mark_taken(email).await;
        email_index::forget(&current.email).await;
    }

    info!(employee_id, fields = ?payload.keys().collect::<Vec<_>>(), "Employee updated");

    find_by_id(pool, employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))
}
