#[cfg(test)]
pub mod fixtures {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;

    use crate::{
        errors::QuizError,
        models::domain::{Difficulty, Question},
        services::generator::TextGenerator,
    };

    const QUESTIONS: [(&str, [&str; 4], usize); 5] = [
        (
            "Which HTTP method is idempotent and used to fetch a resource?",
            ["GET", "POST", "PATCH", "CONNECT"],
            0,
        ),
        (
            "Which status code means the resource was not found?",
            ["200", "301", "404", "500"],
            2,
        ),
        (
            "Which header carries a bearer token?",
            ["Accept", "Authorization", "Content-Type", "Host"],
            1,
        ),
        (
            "Which port does HTTPS use by default?",
            ["21", "25", "80", "443"],
            3,
        ),
        (
            "Which status code signals a successful creation?",
            ["201", "204", "302", "400"],
            0,
        ),
    ];

    /// Five valid networking questions, each with one correct option.
    pub fn question_batch(difficulty: Difficulty) -> Vec<Question> {
        QUESTIONS
            .iter()
            .map(|(question, options, correct)| Question {
                question: question.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_answer: options[*correct].to_string(),
                difficulty,
            })
            .collect()
    }

    /// The same batch as a generator would reply with it.
    pub fn question_batch_json() -> String {
        let items: Vec<serde_json::Value> = QUESTIONS
            .iter()
            .map(|(question, options, correct)| {
                serde_json::json!({
                    "question": question,
                    "options": options,
                    "correctAnswer": options[*correct],
                })
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    /// Replays queued replies in order and records every prompt it sees.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, QuizError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_reply(&self, reply: &str) {
            self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        }

        pub fn push_error(&self, error: QuizError) {
            self.replies.lock().unwrap().push_back(Err(error));
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_text(&self, prompt: &str) -> Result<String, QuizError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(QuizError::GenerationUnavailable(
                    "no scripted reply left".to_string(),
                ))
            })
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::*;
    use crate::{models::domain::Difficulty, services::generator::TextGenerator};
    use actix_web::http::StatusCode;

    #[test]
    fn question_batch_has_one_correct_option_per_question() {
        let batch = question_batch(Difficulty::Hard);
        assert_eq!(batch.len(), 5);
        for question in &batch {
            assert_eq!(question.options.len(), 4);
            assert!(question.has_option(&question.correct_answer));
            assert_eq!(question.difficulty, Difficulty::Hard);
        }
    }

    #[test]
    fn question_batch_json_uses_generator_field_names() {
        let value: serde_json::Value = serde_json::from_str(&question_batch_json()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 5);
        assert_eq!(value[1]["correctAnswer"], "404");
    }

    #[tokio::test]
    async fn scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new();
        generator.push_reply("Easy");

        assert_eq!(generator.generate_text("first").await.unwrap(), "Easy");
        assert!(generator.generate_text("second").await.is_err());
        assert_eq!(generator.prompts(), vec!["first", "second"]);
    }

    #[test]
    fn test_helpers_status_assertions() {
        assert_success_status(StatusCode::OK);
        assert_success_status(StatusCode::CREATED);
        assert_error_status(StatusCode::BAD_REQUEST);
        assert_error_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}
