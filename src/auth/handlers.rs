use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::AppError,
    model::role::Role,
    models::LoginReqDto,
    service::employee as employee_service,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

const INVALID_CREDENTIALS: &str = "Invalid Credentials";

#[derive(Serialize, ToSchema)]
pub struct LoginUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Wrong email or password, or inactive account", body = Object, example = json!({
            "message": "Invalid Credentials"
        })),
        (status = 429, description = "Too many login attempts"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    let Some(employee) = employee_service::find_by_email(&pool, &user.email).await? else {
        info!("Invalid credentials: employee not found");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    };

    if !employee.is_active() {
        info!(employee_id = employee.id, "Login refused: account inactive");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    debug!("Verifying password");
    if let Err(e) = verify_password(&user.password, &employee.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    let token = generate_access_token(
        employee.id,
        employee.email.clone(),
        employee.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, employee_id = employee.id, "Failed to sign access token");
        AppError::Internal("token signing failed".into())
    })?;

    info!(employee_id = employee.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: LoginUser {
            id: employee.id,
            name: employee.name,
            email: employee.email,
            role: employee.role,
        },
    }))
}
