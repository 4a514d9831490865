use std::env;
use std::str::FromStr;

use secrecy::SecretString;

use crate::models::domain::quiz_session::QuizPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub api_key: SecretString,
    pub api_base: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub storage_backend: StorageBackend,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub frontend_base_url: String,
    pub generator: GeneratorConfig,
    pub quiz_policy: QuizPolicy,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = QuizPolicy::default();

        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "learnloop-local".to_string()),
            storage_backend: env_or("STORAGE_BACKEND", StorageBackend::Mongo),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env_or("WEB_SERVER_PORT", 5000),
            jwt_secret: SecretString::from(env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev_secret_key_change_in_production".to_string())),
            jwt_expiration_hours: env_or("JWT_EXPIRATION_HOURS", 1),
            reset_token_ttl_minutes: env_or("RESET_TOKEN_TTL_MINUTES", 60),
            frontend_base_url: env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            generator: GeneratorConfig {
                api_key: SecretString::from(
                    env::var("GENERATOR_API_KEY")
                        .or_else(|_| env::var("GEMINI_API_KEY"))
                        .unwrap_or_default(),
                ),
                api_base: env::var("GENERATOR_API_BASE").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
                }),
                model: env::var("GENERATOR_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            },
            quiz_policy: QuizPolicy {
                remedial_min_sessions: env_or(
                    "QUIZ_REMEDIAL_MIN_SESSIONS",
                    defaults.remedial_min_sessions,
                ),
                remedial_window: env_or("QUIZ_REMEDIAL_WINDOW", defaults.remedial_window),
                passing_score: env_or("QUIZ_PASSING_SCORE", defaults.passing_score),
                remedial_success_rate: env_or(
                    "QUIZ_REMEDIAL_SUCCESS_RATE",
                    defaults.remedial_success_rate,
                ),
                break_after_minutes: env_or(
                    "QUIZ_BREAK_AFTER_MINUTES",
                    defaults.break_after_minutes,
                ),
            },
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.generator.api_key.expose_secret().is_empty() {
            panic!(
                "FATAL: GENERATOR_API_KEY is not set! Set GENERATOR_API_KEY (or GEMINI_API_KEY)."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "learnloop-test".to_string(),
            storage_backend: StorageBackend::Memory,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            reset_token_ttl_minutes: 60,
            frontend_base_url: "http://localhost:3000".to_string(),
            generator: GeneratorConfig {
                api_key: SecretString::from("test-key".to_string()),
                api_base: "http://localhost:9999/v1".to_string(),
                model: "test-model".to_string(),
            },
            quiz_policy: QuizPolicy::default(),
        }
    }
}
