use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{subject::SubtopicLevel, Difficulty, Emotion, QuizHints};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[validate(length(max = 100))]
    pub first_name: Option<String>,

    #[validate(length(max = 100))]
    pub last_name: Option<String>,

    #[validate(length(max = 30))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,

    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubtopicRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    pub level: SubtopicLevel,
}

/// Query parameters of the stateless quiz endpoint. The client sends
/// whatever it kept from the previous attempt; blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHintsQuery {
    pub previous_score: Option<String>,
    pub previous_emotion: Option<String>,
    pub previous_difficulty: Option<String>,
}

impl QuizHintsQuery {
    /// Values that do not parse are dropped rather than rejected, the same
    /// as a first attempt with no history.
    pub fn into_hints(self) -> QuizHints {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != "undefined" && v != "null")
        }

        QuizHints {
            previous_score: present(self.previous_score)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|score| score.clamp(0.0, 100.0).round() as u8),
            previous_emotion: present(self.previous_emotion).and_then(|v| v.parse::<Emotion>().ok()),
            previous_difficulty: present(self.previous_difficulty)
                .and_then(|v| Difficulty::normalize(&v).ok()),
        }
    }
}

/// A quiz scored by the client, as posted to `quiz-results`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultRequest {
    #[validate(range(max = 100))]
    pub score: u8,

    #[serde(default)]
    pub emotion: Option<Emotion>,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default, alias = "timeSpentSeconds")]
    #[validate(range(min = 0))]
    pub time_spent: i64,

    /// Quizzes taken in a row on this subtopic, including this one.
    #[serde(default, alias = "subtopicAttempts")]
    pub consecutive_sessions: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub score: u8,
    #[serde(default)]
    pub emotion: Option<Emotion>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedContentRequest {
    /// Falls back to the recorded history when empty.
    #[serde(default)]
    pub quiz_history: Vec<HistoryEntry>,

    #[serde(default)]
    pub current_emotion: Option<Emotion>,

    #[serde(default)]
    pub subtopic_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectAnswerRequest {
    pub index: usize,
    pub option: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    pub delta: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitSessionRequest {
    #[serde(default)]
    pub emotion: Option<Emotion>,
}
