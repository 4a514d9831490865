use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{Difficulty, Emotion};

/// One completed quiz. Append-only: never updated after it is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    pub subtopic_id: String,
    pub score: u8,
    pub emotion: Emotion,
    pub difficulty: Difficulty,
    pub time_spent_seconds: i64,
    pub timestamp: DateTime<Utc>,
}

impl QuizAttempt {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        subject_id: &str,
        subtopic_id: &str,
        score: u8,
        emotion: Emotion,
        difficulty: Difficulty,
        time_spent_seconds: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            subject_id: subject_id.to_string(),
            subtopic_id: subtopic_id.to_string(),
            score: score.min(100),
            emotion,
            difficulty,
            time_spent_seconds: time_spent_seconds.max(0),
            timestamp,
        }
    }
}

/// Continuity hints carried from the previous attempt into the next
/// difficulty decision. All absent means "no prior data".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizHints {
    pub previous_score: Option<u8>,
    pub previous_emotion: Option<Emotion>,
    pub previous_difficulty: Option<Difficulty>,
}

impl QuizHints {
    pub fn is_empty(&self) -> bool {
        self.previous_score.is_none()
            && self.previous_emotion.is_none()
            && self.previous_difficulty.is_none()
    }
}

impl From<&QuizAttempt> for QuizHints {
    fn from(attempt: &QuizAttempt) -> Self {
        QuizHints {
            previous_score: Some(attempt.score),
            previous_emotion: Some(attempt.emotion),
            previous_difficulty: Some(attempt.difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_attempt(score: u8) -> QuizAttempt {
        QuizAttempt::new(
            "user-1",
            "subject-1",
            "subtopic-1",
            score,
            Emotion::Happy,
            Difficulty::Medium,
            95,
            Utc::now(),
        )
    }

    #[test]
    fn quiz_attempt_round_trip_serialization_preserves_fields() {
        let attempt = make_attempt(80);

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: QuizAttempt = serde_json::from_str(&json).expect("attempt should deserialize");

        assert_eq!(parsed, attempt);
    }

    #[test]
    fn new_clamps_out_of_range_values() {
        let attempt = QuizAttempt::new(
            "u",
            "s",
            "t",
            250,
            Emotion::Sad,
            Difficulty::Hard,
            -5,
            Utc::now(),
        );
        assert_eq!(attempt.score, 100);
        assert_eq!(attempt.time_spent_seconds, 0);
    }

    #[test]
    fn hints_from_attempt_carry_score_emotion_and_difficulty() {
        let hints = QuizHints::from(&make_attempt(85));
        assert_eq!(hints.previous_score, Some(85));
        assert_eq!(hints.previous_emotion, Some(Emotion::Happy));
        assert_eq!(hints.previous_difficulty, Some(Difficulty::Medium));
        assert!(!hints.is_empty());
        assert!(QuizHints::default().is_empty());
    }
}
