use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::holiday::Holiday,
    service::holiday::{self as holiday_service, NewHoliday},
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;

#[utoipa::path(
    get,
    path = "/api/holidays",
    responses(
        (status = 200, description = "Holidays sorted by date", body = [Holiday]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(_auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, AppError> {
    let holidays = holiday_service::list(&pool).await?;
    Ok(HttpResponse::Ok().json(holidays))
}

/// Add a holiday (Admin only); `type` defaults to "Public"
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = NewHoliday,
    responses(
        (status = 200, description = "Holiday added", body = Holiday),
        (status = 400, description = "Missing name or date"),
        (status = 403, description = "Access Denied")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewHoliday>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let holiday = holiday_service::create(&pool, &payload).await?;
    Ok(HttpResponse::Ok().json(holiday))
}

#[utoipa::path(
    delete,
    path = "/api/holidays/{holiday_id}",
    params(
        ("holiday_id", Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Holiday removed", body = Object, example = json!({
            "message": "Holiday removed"
        })),
        (status = 403, description = "Access Denied"),
        (status = 404, description = "Holiday not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    if !holiday_service::delete(&pool, path.into_inner()).await? {
        return Err(AppError::not_found("Holiday not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Holiday removed" })))
}
