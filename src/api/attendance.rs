use crate::{
    auth::auth::AuthUser,
    config::Config,
    domain::{
        manual_override::{OverrideRequest, StatusChoice},
        office_config::parse_hhmm,
    },
    error::AppError,
    model::attendance::{AttendanceLogEntry, AttendanceRecord},
    service::attendance as attendance_service,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendance {
    /// Office-local time of day, `HH:MM`
    #[schema(example = "09:40")]
    pub check_in: String,
    #[schema(example = "18:30")]
    pub check_out: Option<String>,
    /// An attendance status, or `"Auto"` to recompute it from the check-in time
    #[schema(example = "Auto", value_type = String)]
    pub status: StatusChoice,
    #[schema(example = "Badge reader fault")]
    pub note: Option<String>,
}

fn parse_time(field: &str, raw: &str) -> Result<NaiveTime, AppError> {
    parse_hhmm(raw).ok_or_else(|| AppError::bad_request(format!("{field} must be HH:MM")))
}

impl UpdateAttendance {
    fn into_request(self) -> Result<OverrideRequest, AppError> {
        Ok(OverrideRequest {
            check_in: parse_time("checkIn", &self.check_in)?,
            check_out: self
                .check_out
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_time("checkOut", s))
                .transpose()?,
            status: self.status,
            note: self.note.unwrap_or_default(),
        })
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 200, description = "Checked in, status classified", body = AttendanceRecord),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in for today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let record =
        attendance_service::check_in(&pool, &config.office_clock(), auth.employee_id, Utc::now())
            .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out, hours recorded", body = AttendanceRecord),
        (status = 400, description = "No check-in today, or already checked out", body = Object, example = json!({
            "message": "No check-in record found for today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let record =
        attendance_service::check_out(&pool, &config.office_clock(), auth.employee_id, Utc::now())
            .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Own latest 30 records, newest first. Forgotten check-outs are closed first.
#[utoipa::path(
    get,
    path = "/api/attendance/my-logs",
    responses(
        (status = 200, description = "Own attendance records", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let logs =
        attendance_service::my_logs(&pool, &config.office_clock(), auth.employee_id, Utc::now())
            .await?;

    Ok(HttpResponse::Ok().json(logs))
}

#[utoipa::path(
    get,
    path = "/api/attendance/all-logs",
    responses(
        (status = 200, description = "Every record with its employee", body = [AttendanceLogEntry]),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn all_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let logs = attendance_service::all_logs(&pool, &config.office_clock(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(logs))
}

#[utoipa::path(
    get,
    path = "/api/attendance/admin/user-logs/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "One employee's records", body = [AttendanceRecord]),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn user_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let logs =
        attendance_service::user_logs(&pool, &config.office_clock(), employee_id, Utc::now())
            .await?;

    Ok(HttpResponse::Ok().json(logs))
}

/// Manual correction of a record by HR/Admin
#[utoipa::path(
    put,
    path = "/api/attendance/update/{record_id}",
    params(
        ("record_id", Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Record updated", body = AttendanceRecord),
        (status = 400, description = "Invalid times", body = Object, example = json!({
            "message": "Check-out cannot be before check-in."
        })),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<UpdateAttendance>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let request = body.into_inner().into_request()?;
    let record =
        attendance_service::manual_update(&pool, &config.office_clock(), path.into_inner(), &request)
            .await?;

    Ok(HttpResponse::Ok().json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;

    #[test]
    fn update_body_parses_times_and_status() {
        let body: UpdateAttendance = serde_json::from_value(serde_json::json!({
            "checkIn": "09:40",
            "checkOut": "",
            "status": "Late"
        }))
        .unwrap();

        let req = body.into_request().unwrap();
        assert_eq!(req.check_in, NaiveTime::from_hms_opt(9, 40, 0).unwrap());
        assert_eq!(req.check_out, None);
        assert_eq!(req.status, StatusChoice::Explicit(AttendanceStatus::Late));
        assert_eq!(req.note, "");
    }

    #[test]
    fn malformed_time_is_a_bad_request() {
        let body: UpdateAttendance = serde_json::from_value(serde_json::json!({
            "checkIn": "9.40am",
            "status": "Auto"
        }))
        .unwrap();

        assert!(matches!(body.into_request(), Err(AppError::BadRequest(_))));
    }
}
