use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    service::dashboard::{self as dashboard_service, AdminStats, EmployeeStats},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use sqlx::MySqlPool;

/// Organisation-wide counters for HR/Admin
#[utoipa::path(
    get,
    path = "/api/dashboard/admin-stats",
    responses(
        (status = 200, description = "Counters for today", body = AdminStats, example = json!({
            "totalEmployees": 42,
            "presentToday": 37,
            "pendingLeaves": 3,
            "onLeaveToday": 2
        })),
        (status = 403, description = "Access Denied")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn admin_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let stats = dashboard_service::admin_stats(&pool, &config.office_clock(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/employee-stats",
    responses(
        (status = 200, description = "Caller's balances, pending requests and days present this month", body = EmployeeStats, example = json!({
            "balances": { "CL": 1, "EL": 4 },
            "myPending": 1,
            "presentDays": 12
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn employee_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let stats = dashboard_service::employee_stats(
        &pool,
        &config.office_clock(),
        auth.employee_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(stats))
}
