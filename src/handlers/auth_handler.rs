use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest},
        response::{CurrentUserResponse, MessageResponse, TokenResponse},
    },
};

#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    state.user_service.signup(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let token = state.user_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[get("/auth/user")]
pub async fn current_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(CurrentUserResponse::from(user)))
}

#[post("/auth/forgot-password")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    validator::Validate::validate(&request)?;

    state.user_service.forgot_password(&request.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset link sent to email")))
}

#[post("/auth/reset-password/{token}")]
pub async fn reset_password(
    state: web::Data<AppState>,
    token: web::Path<String>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .user_service
        .reset_password(&token, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}
