use crate::{
    api::{attendance, dashboard, employee, holiday, leave_request, settings},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{error::JsonPayloadError, middleware::from_fn, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter settings, built once at startup and shared by every worker.
#[derive(Clone)]
pub struct RateLimits {
    login: LimiterConfig,
    protected: LimiterConfig,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: limiter_config(config.rate_login_per_min)?,
            protected: limiter_config(config.rate_protected_per_min)?,
        })
    }
}

fn limiter_config(requests_per_min: u32) -> Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))
}

/// Malformed or incomplete JSON bodies answer with the usual `{"message"}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
            JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
            other => format!("Invalid request body: {other}"),
        };
        AppError::bad_request(message).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    cfg.app_data(json_config());

    let login_limiter = Arc::new(Governor::new(&limits.login));
    let protected_limiter = Arc::new(Governor::new(&limits.protected));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/me (before /{id})
                    .service(web::resource("/me").route(web::get().to(employee::get_me)))
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .route("/checkin", web::post().to(attendance::check_in))
                    .route("/checkout", web::post().to(attendance::check_out))
                    .route("/my-logs", web::get().to(attendance::my_logs))
                    .route("/all-logs", web::get().to(attendance::all_logs))
                    .route("/admin/user-logs/{id}", web::get().to(attendance::user_logs))
                    .route("/update/{id}", web::put().to(attendance::update_record)),
            )
            .service(
                web::scope("/leaves")
                    .route("/my-leaves", web::get().to(leave_request::my_leaves))
                    .route("/apply", web::post().to(leave_request::apply_leave))
                    .route("/action/{id}", web::put().to(leave_request::leave_action))
                    .route("/all-requests", web::get().to(leave_request::all_requests))
                    .route(
                        "/admin/user-leaves/{id}",
                        web::get().to(leave_request::user_leaves),
                    )
                    .route(
                        "/admin/update-balance",
                        web::post().to(leave_request::update_balance),
                    ),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get_settings))
                    .route(web::put().to(settings::update_settings)),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(holiday::delete_holiday))),
            )
            .service(
                web::scope("/dashboard")
                    .route("/admin-stats", web::get().to(dashboard::admin_stats))
                    .route("/employee-stats", web::get().to(dashboard::employee_stats)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_clamped_rather_than_rejected() {
        assert!(limiter_config(0).is_ok());
        assert!(limiter_config(60).is_ok());
    }

    #[actix_web::test]
    async fn incomplete_body_answers_with_a_message() {
        use crate::api::leave_request::ApplyLeave;
        use actix_web::{App, HttpResponse, http::StatusCode, test};

        let app = test::init_service(App::new().app_data(json_config()).route(
            "/apply",
            web::post().to(|_: web::Json<ApplyLeave>| async { HttpResponse::Ok().finish() }),
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/apply")
            .set_json(serde_json::json!({ "leaveType": "CL", "fromDate": "2026-03-02" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid request body"), "{message}");
    }

    #[test]
    fn limits_build_from_config() {
        assert!(RateLimits::from_config(&Config::for_tests()).is_ok());
    }
}
