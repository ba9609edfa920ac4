use crate::{
    auth::auth::AuthUser,
    config::Config,
    domain::ledger::Decision,
    error::AppError,
    model::{
        employee::Employee,
        leave_request::{LeaveRequest, LeaveRequestEntry, LeaveStatus, LeaveType},
    },
    service::leave::{self as leave_service, Application, LeaveHistory, MyLeaves},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeave {
    #[schema(example = "CL")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2026-03-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaveAction {
    /// `Approved` or `Rejected`
    #[schema(example = "Approved")]
    pub status: LeaveStatus,
}

impl LeaveAction {
    fn decision(&self) -> Result<Decision, AppError> {
        match self.status {
            LeaveStatus::Approved => Ok(Decision::Approve),
            LeaveStatus::Rejected => Ok(Decision::Reject),
            LeaveStatus::Pending => Err(AppError::bad_request(
                "Status must be Approved or Rejected",
            )),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalance {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 2)]
    pub cl: Option<i32>,
    #[schema(example = 10)]
    pub el: Option<i32>,
    #[schema(example = 52000.0)]
    pub salary: Option<f64>,
}

/// Own leave history and what can still be applied for
#[utoipa::path(
    get,
    path = "/api/leaves/my-leaves",
    responses(
        (status = 200, description = "History and available balances", body = MyLeaves, example = json!({
            "history": [],
            "balances": { "CL": 1, "EL": 4 }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let leaves =
        leave_service::my_leaves(&pool, &config.office_clock(), auth.employee_id, Utc::now())
            .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/// Apply for leave
#[utoipa::path(
    post,
    path = "/api/leaves/apply",
    request_body(
        content = ApplyLeave,
        description = "Leave application",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Application filed as Pending", body = LeaveRequest),
        (status = 400, description = "Validation failed or balance too low", body = Object, example = json!({
            "message": "Insufficient CL balance. You have 1 days available."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ApplyLeave>,
) -> Result<impl Responder, AppError> {
    let payload = payload.into_inner();
    let application = Application {
        leave_type: payload.leave_type,
        from_date: payload.from_date,
        to_date: payload.to_date,
        reason: payload.reason,
    };

    let request = leave_service::apply(
        &pool,
        &config.office_clock(),
        auth.employee_id,
        &application,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Approve or reject a pending request
#[utoipa::path(
    put,
    path = "/api/leaves/action/{leave_id}",
    params(
        ("leave_id", Path, description = "Leave request ID")
    ),
    request_body = LeaveAction,
    responses(
        (status = 200, description = "Request decided", body = LeaveRequest),
        (status = 400, description = "Already processed or balance too low", body = Object, example = json!({
            "message": "Request already processed"
        })),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "Leave not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_action(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    payload: web::Json<LeaveAction>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let decision = payload.decision()?;
    let request = leave_service::decide(
        &pool,
        &config.office_clock(),
        path.into_inner(),
        decision,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/leaves/all-requests",
    responses(
        (status = 200, description = "Every request with its employee", body = [LeaveRequestEntry]),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn all_requests(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let requests = leave_service::all_requests(&pool).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    get,
    path = "/api/leaves/admin/user-leaves/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "One employee's leave history", body = LeaveHistory),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn user_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let history = leave_service::history(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// Overwrite an employee's leave balances and salary
#[utoipa::path(
    post,
    path = "/api/leaves/admin/update-balance",
    request_body = UpdateBalance,
    responses(
        (status = 200, description = "Balances updated", body = Object, example = json!({
            "message": "User profile updated successfully",
            "user": { "id": 7, "casualLeaveBalance": 2, "earnedLeaveBalance": 10 }
        })),
        (status = 400, description = "Negative balance or salary"),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateBalance>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let user: Employee = leave_service::grant_balance(
        &pool,
        payload.user_id,
        payload.cl,
        payload.el,
        payload.salary,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User profile updated successfully",
        "user": user
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_body_uses_short_leave_codes() {
        let body: ApplyLeave = serde_json::from_value(json!({
            "leaveType": "EL",
            "fromDate": "2026-03-02",
            "toDate": "2026-03-04",
            "reason": "Travel"
        }))
        .unwrap();
        assert_eq!(body.leave_type, LeaveType::EL);
        assert!(serde_json::from_value::<ApplyLeave>(json!({
            "leaveType": "SL",
            "fromDate": "2026-03-02",
            "toDate": "2026-03-04",
            "reason": "Travel"
        }))
        .is_err());
    }

    #[test]
    fn action_must_be_a_final_status() {
        let approve = LeaveAction { status: LeaveStatus::Approved };
        assert_eq!(approve.decision().unwrap(), Decision::Approve);

        let pending = LeaveAction { status: LeaveStatus::Pending };
        assert!(matches!(pending.decision(), Err(AppError::BadRequest(_))));
    }
}
