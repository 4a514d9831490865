use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::dto::request::SignupRequest;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: &str) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_lowercase(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            created_at: Some(Utc::now()),
            last_login: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
        }
    }

    pub fn from_signup(request: SignupRequest, password_hash: &str) -> Self {
        let mut user = User::new(&request.username, &request.email, password_hash);
        user.first_name = request.first_name.unwrap_or_default();
        user.last_name = request.last_name.unwrap_or_default();
        user.phone_number = request.phone_number.unwrap_or_default();
        user
    }

    pub fn has_valid_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > now,
            _ => false,
        }
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_token_expires_at = None;
    }
}
