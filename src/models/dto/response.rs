use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    subject::SubtopicLevel, BreakSuggestion, Difficulty, Emotion, NextAction, Question, QuizAttempt,
    QuizPolicy, QuizSession, SessionState, Subject, Subtopic, User,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        CurrentUserResponse {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtopicResponse {
    pub id: String,
    pub name: String,
    pub content: String,
    pub level: SubtopicLevel,
    pub generated: bool,
}

impl From<Subtopic> for SubtopicResponse {
    fn from(subtopic: Subtopic) -> Self {
        SubtopicResponse {
            id: subtopic.id,
            name: subtopic.name,
            content: subtopic.content,
            level: subtopic.level,
            generated: subtopic.generated,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub subtopics: Vec<SubtopicResponse>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Subject> for SubjectResponse {
    fn from(subject: Subject) -> Self {
        SubjectResponse {
            id: subject.id,
            name: subject.name,
            description: subject.description,
            image_url: subject.image_url,
            subtopics: subject.subtopics.into_iter().map(SubtopicResponse::from).collect(),
            created_at: subject.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: String,
    pub subject_id: String,
    pub subtopic_id: String,
    pub score: u8,
    pub emotion: Emotion,
    pub difficulty: Difficulty,
    pub time_spent_seconds: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<QuizAttempt> for AttemptResponse {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptResponse {
            id: attempt.id,
            subject_id: attempt.subject_id,
            subtopic_id: attempt.subtopic_id,
            score: attempt.score,
            emotion: attempt.emotion,
            difficulty: attempt.difficulty,
            time_spent_seconds: attempt.time_spent_seconds,
            timestamp: attempt.timestamp,
        }
    }
}

/// Stateless quiz: the client keeps progress and scores locally, so the
/// correct answers are included.
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultResponse {
    pub attempt: AttemptResponse,
    pub next_action: NextAction,
    pub recent_success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizHistoryResponse {
    pub attempts: Vec<AttemptResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestionView {
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Client view of a checkpointed session. Correct answers stay hidden
/// until the quiz has been submitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    pub subject_id: String,
    pub subtopic_id: String,
    pub difficulty: Option<Difficulty>,
    pub current_index: usize,
    pub questions: Vec<SessionQuestionView>,
    pub answers: Vec<Option<String>>,
    pub unanswered: Vec<usize>,
    pub submittable: bool,
    pub elapsed_seconds: i64,
    pub consecutive_sessions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<AttemptResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_suggestion: Option<BreakSuggestion>,
}

impl SessionView {
    pub fn new(session: &QuizSession, now: DateTime<Utc>, policy: &QuizPolicy) -> Self {
        let reveal = !matches!(
            session.state(),
            SessionState::Loading | SessionState::InProgress
        );

        SessionView {
            state: session.state(),
            subject_id: session.subject_id().to_string(),
            subtopic_id: session.subtopic_id().to_string(),
            difficulty: session.difficulty(),
            current_index: session.current_index(),
            questions: session
                .questions()
                .iter()
                .map(|q| SessionQuestionView {
                    question: q.question.clone(),
                    options: q.options.clone(),
                    correct_answer: reveal.then(|| q.correct_answer.clone()),
                })
                .collect(),
            answers: session.answers().to_vec(),
            unanswered: session.unanswered(),
            submittable: session.is_submittable(),
            elapsed_seconds: session.elapsed_seconds(now),
            consecutive_sessions: session.consecutive_sessions(),
            last_attempt: session.last_attempt().cloned().map(AttemptResponse::from),
            break_suggestion: session.break_suggestion(now, policy),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSessionResponse {
    pub session: SessionView,
    pub next_action: NextAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::question_batch;

    #[test]
    fn test_current_user_response_hides_password_hash() {
        let user = User::new("JohnDoe", "john@example.com", "argon2-hash");
        let json = serde_json::to_value(CurrentUserResponse::from(user)).unwrap();

        assert_eq!(json["username"], "johndoe");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn session_view_hides_correct_answers_while_in_progress() {
        let mut session = QuizSession::new("u", "s", "t");
        session
            .begin(question_batch(Difficulty::Easy), Difficulty::Easy, Utc::now())
            .unwrap();

        let json = serde_json::to_value(SessionView::new(&session, Utc::now(), &QuizPolicy::default())).unwrap();

        assert_eq!(json["state"], "in_progress");
        assert_eq!(json["questions"].as_array().unwrap().len(), 5);
        assert!(json["questions"][0].get("correctAnswer").is_none());
        assert!(json.get("breakSuggestion").is_none());
    }

    #[test]
    fn session_view_reveals_answers_after_submission() {
        let mut session = QuizSession::new("u", "s", "t");
        session
            .begin(question_batch(Difficulty::Easy), Difficulty::Easy, Utc::now())
            .unwrap();
        for index in 0..5 {
            let option = session.questions()[index].options[0].clone();
            session.select_answer(index, &option).unwrap();
        }
        session.submit(None, Utc::now()).unwrap();

        let view = SessionView::new(&session, Utc::now(), &QuizPolicy::default());
        assert!(view.questions.iter().all(|q| q.correct_answer.is_some()));
        assert!(view.last_attempt.is_some());
        assert!(!view.submittable);
    }
}
