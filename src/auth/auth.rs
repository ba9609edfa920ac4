use crate::{config::Config, error::AppError, model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use super::jwt::verify_token;

/// The caller as established by the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            employee_id: claims.employee_id,
            email: claims.sub,
            role: claims.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by `auth_middleware` on the protected scope.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(AppError::Unauthorized("Missing token".into()))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::Internal("Config missing".into()))),
        };

        ready(
            verify_token(token, &config.jwt_secret)
                .map(AuthUser::from)
                .map_err(|_| AppError::Unauthorized("Invalid token".into())),
        )
    }
}

pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden("Access Denied"))
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(AppError::forbidden("Access Denied"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use actix_web::{ResponseError, http::StatusCode, test::TestRequest};

    fn token_for(role: Role, secret: &str) -> String {
        generate_access_token(5, "emp@company.com".into(), role, secret, 600).unwrap()
    }

    #[actix_web::test]
    async fn extracts_user_from_valid_bearer_token() {
        let config = Config::for_tests();
        let token = token_for(Role::Employee, &config.jwt_secret);
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .app_data(Data::new(config))
            .to_http_request();

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.employee_id, 5);
        assert_eq!(user.role, Role::Employee);
        assert!(user.require_hr_or_admin().is_err());
    }

    #[actix_web::test]
    async fn missing_or_forged_token_is_unauthorized() {
        let config = Config::for_tests();
        let req = TestRequest::default()
            .app_data(Data::new(config.clone()))
            .to_http_request();
        let err = AuthUser::extract(&req).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let forged = token_for(Role::Admin, "someone-else");
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {forged}")))
            .app_data(Data::new(config))
            .to_http_request();
        let err = AuthUser::extract(&req).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn middleware_supplied_user_wins() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            employee_id: 9,
            email: "admin@company.com".into(),
            role: Role::Admin,
        });

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.employee_id, 9);
        assert!(user.require_admin().is_ok());
    }

    #[test]
    fn hr_is_not_admin() {
        let hr = AuthUser {
            employee_id: 1,
            email: "hr@company.com".into(),
            role: Role::Hr,
        };
        assert!(hr.require_hr_or_admin().is_ok());
        assert_eq!(
            hr.require_admin().unwrap_err().status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
