use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Which step of the generator-output pipeline rejected the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStage {
    Extract,
    Parse,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Extract => write!(f, "extract"),
            GenerationStage::Parse => write!(f, "parse"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Generator returned an invalid difficulty: {0:?}")]
    InvalidDifficulty(String),

    #[error("Malformed generator output ({stage} stage): {detail}")]
    MalformedGeneration {
        stage: GenerationStage,
        detail: String,
    },

    #[error("Generator returned {found} questions, expected {expected}")]
    InvalidQuestionCount { found: usize, expected: usize },

    #[error("Invalid question at index {index}: {reason}")]
    InvalidQuestionFormat { index: usize, reason: String },

    #[error("Content generator unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Please attempt all questions before submitting (unanswered: {missing:?})")]
    IncompleteSubmission { missing: Vec<usize> },

    #[error("Quiz attempt was scored but not recorded: {0}")]
    PersistenceFailure(String),

    #[error("Cannot {action} while the quiz session is {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),
}

impl QuizError {
    /// True when the generator answered but the answer was unusable.
    pub fn is_unusable_generation(&self) -> bool {
        matches!(
            self,
            QuizError::InvalidDifficulty(_)
                | QuizError::MalformedGeneration { .. }
                | QuizError::InvalidQuestionCount { .. }
                | QuizError::InvalidQuestionFormat { .. }
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            QuizError::InvalidDifficulty(_) => "INVALID_DIFFICULTY",
            QuizError::MalformedGeneration { .. } => "MALFORMED_GENERATION",
            QuizError::InvalidQuestionCount { .. } => "INVALID_QUESTION_COUNT",
            QuizError::InvalidQuestionFormat { .. } => "INVALID_QUESTION_FORMAT",
            QuizError::GenerationUnavailable(_) => "GENERATION_UNAVAILABLE",
            QuizError::IncompleteSubmission { .. } => "INCOMPLETE_SUBMISSION",
            QuizError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            QuizError::InvalidTransition { .. } => "INVALID_TRANSITION",
            QuizError::InvalidAnswer(_) => "INVALID_ANSWER",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            QuizError::InvalidDifficulty(_)
            | QuizError::MalformedGeneration { .. }
            | QuizError::InvalidQuestionCount { .. }
            | QuizError::InvalidQuestionFormat { .. } => StatusCode::BAD_GATEWAY,
            QuizError::GenerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            QuizError::IncompleteSubmission { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            QuizError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QuizError::InvalidTransition { .. } => StatusCode::CONFLICT,
            QuizError::InvalidAnswer(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Quiz(#[from] QuizError),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::Quiz(err) => err.kind(),
        }
    }

    /// Message shown to API clients. Generator failures get a generic
    /// "try again" text; the detailed cause only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Quiz(err) if err.is_unusable_generation() => {
                "The quiz generator produced unusable output, please try again".to_string()
            }
            AppError::Quiz(QuizError::GenerationUnavailable(_)) => {
                "The content generator is currently unavailable, please try again".to_string()
            }
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Quiz(err) => err.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{} ({}): {}", self.error_code(), status.as_u16(), self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.public_message(),
            code: status.as_u16(),
            kind: self.error_code(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(format!("Invalid token: {}", err))
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
