use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    model::employee::Employee,
    service::employee::{self as employee_service, EmployeePage, EmployeeQuery, NewEmployee},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::debug;

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee created successfully", body = Object, example = json!({
            "message": "Employee added successfully"
        })),
        (status = 400, description = "Missing fields or email taken", body = Object, example = json!({
            "message": "User already exists"
        })),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Internal Server Error"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<NewEmployee>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let now = Utc::now();
    let today = config.office_clock().day_of(now);
    let employee = employee_service::create(&pool, &payload, today, now).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee added successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    params(
        ("page",  Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("status", Query, description = "Filter by status (ACTIVE, INACTIVE)"),
        ("role", Query, description = "Filter by role (ADMIN, HR, EMPLOYEE)"),
        ("search", Query, description = "Search by name or email")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeePage),
        (status = 403, description = "Access Denied")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let page = employee_service::list(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Own profile
#[utoipa::path(
    get,
    path = "/api/employee/me",
    responses(
        (status = 200, description = "Caller's employee profile", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, AppError> {
    let employee = employee_service::find_by_id(&pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let employee = employee_service::find_by_id(&pool, employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
///
/// Accepts any subset of: name, email, password, role, status, joiningDate,
/// salary, phoneNumber, address, emergencyContact, casualLeaveBalance,
/// earnedLeaveBalance. Deactivate with `"status": "INACTIVE"`.
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Unknown or invalid field", body = Object, example = json!({
            "message": "Field 'id' cannot be updated"
        })),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let Value::Object(payload) = body.into_inner() else {
        debug!(employee_id, "Rejected non-object update body");
        return Err(AppError::bad_request("Request body must be a JSON object"));
    };

    let employee = employee_service::update(&pool, employee_id, payload).await?;
    Ok(HttpResponse::Ok().json(employee))
}
