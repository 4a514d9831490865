use std::future::{ready, Ready};

use actix_web::{dev::ServiceRequest, web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;

use crate::{app_state::AppState, auth::Claims, errors::AppError};

/// Bearer validator for `HttpAuthentication::bearer`. Valid tokens leave
/// their `Claims` in the request extensions.
pub async fn validate_bearer(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let validation = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.jwt_service.validate_token(credentials.token()));

    match validation {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Some(Err(err)) => {
            log::debug!("Rejected bearer token: {}", err);
            Err((AppError::Unauthorized("Please authenticate".to_string()).into(), req))
        }
        None => Err((
            AppError::InternalError("Application state not configured".to_string()).into(),
            req,
        )),
    }
}

// Extractor for authenticated user in handlers
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        self.0.user_id()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Please authenticate".to_string()));

        ready(claims.map(AuthenticatedUser))
    }
}
