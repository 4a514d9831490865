use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, hash_reset_token, verify_password},
        JwtService,
    },
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::request::{LoginRequest, ResetPasswordRequest, SignupRequest},
    },
    repositories::UserRepository,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    reset_token_ttl: Duration,
    frontend_base_url: String,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        reset_token_ttl_minutes: i64,
        frontend_base_url: &str,
    ) -> Self {
        Self {
            repository,
            jwt_service,
            reset_token_ttl: Duration::minutes(reset_token_ttl_minutes),
            frontend_base_url: frontend_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<User> {
        request.validate()?;

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Email is already registered".to_string(),
            ));
        }
        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Username is already taken".to_string()));
        }

        let password_hash = hash_password(&request.password).await?;
        let user = self
            .repository
            .create(User::from_signup(request, &password_hash))
            .await?;

        log::info!("Registered user '{}'", user.username);
        Ok(user)
    }

    /// Returns a signed token and records the login time.
    pub async fn login(&self, request: LoginRequest) -> AppResult<String> {
        request.validate()?;

        let mut user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash).await? {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        user.last_login = Some(Utc::now());
        let user = self.repository.update(user).await?;

        self.jwt_service.create_token(&user)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Issues a reset token and returns the plain token. Only its hash is
    /// stored; the link is logged in place of sending an email.
    pub async fn forgot_password(&self, email: &str) -> AppResult<String> {
        let mut user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = Uuid::new_v4().simple().to_string();
        user.reset_token_hash = Some(hash_reset_token(&token));
        user.reset_token_expires_at = Some(Utc::now() + self.reset_token_ttl);
        self.repository.update(user).await?;

        log::info!(
            "Password reset link: {}/reset-password/{}",
            self.frontend_base_url,
            token
        );
        Ok(token)
    }

    pub async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> AppResult<()> {
        request.validate()?;

        let token_hash = hash_reset_token(token);
        let invalid = || AppError::ValidationError("Invalid or expired reset token".to_string());

        let mut user = self
            .repository
            .find_by_reset_token_hash(&token_hash)
            .await?
            .ok_or_else(invalid)?;

        if !user.has_valid_reset_token(&token_hash, Utc::now()) {
            return Err(invalid());
        }

        user.password_hash = hash_password(&request.password).await?;
        user.clear_reset_token();
        self.repository.update(user).await?;
        Ok(())
    }
}
