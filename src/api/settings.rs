use crate::{
    auth::auth::AuthUser, error::AppError, model::office_settings::OfficeSettings,
    service::settings as settings_service,
};
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;

/// Office rules; created with defaults on first read
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current office settings", body = OfficeSettings, example = json!({
            "officeStartTime": "09:30",
            "officeCloseTime": "18:30",
            "gracePeriod": 15,
            "halfDayThreshold": 30
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(_auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, AppError> {
    let settings = settings_service::get_or_create(&pool).await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = OfficeSettings,
    responses(
        (status = 200, description = "Settings saved", body = OfficeSettings),
        (status = 400, description = "Invalid settings", body = Object, example = json!({
            "message": "officeStartTime must be a time in HH:MM format"
        })),
        (status = 403, description = "Access Denied"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<OfficeSettings>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let saved = settings_service::update(&pool, &payload).await?;
    Ok(HttpResponse::Ok().json(saved))
}
