use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
    models::domain::User,
};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            expiration_hours,
        }
    }

    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let claims = Claims::new(user, self.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Token signature is invalid".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_jwt_create_and_validate() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret, 1);

        let user = User::new("johndoe", "john@example.com", "hash");
        let token = jwt_service.create_token(&user).unwrap();
        assert!(!token.is_empty());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "john@example.com");
    }

    #[test]
    fn test_jwt_invalid_token() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret, 1);

        assert!(matches!(
            jwt_service.validate_token("invalid.token.here"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_jwt_rejects_token_signed_with_other_secret() {
        let user = User::new("johndoe", "john@example.com", "hash");
        let issuer = JwtService::new(&SecretString::from("first-secret-that-is-long-enough"), 1);
        let verifier = JwtService::new(&SecretString::from("second-secret-that-is-long-enough"), 1);

        let token = issuer.create_token(&user).unwrap();
        match verifier.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("signature")),
            other => panic!("expected signature error, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_jwt_rejects_expired_token() {
        let user = User::new("johndoe", "john@example.com", "hash");
        let jwt_service = JwtService::new(&SecretString::from("expired-token-secret-long-enough"), -2);

        let token = jwt_service.create_token(&user).unwrap();
        match jwt_service.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected expiry error, got {:?}", other.map(|c| c.sub)),
        }
    }
}
