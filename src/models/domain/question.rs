use serde::{Deserialize, Serialize};

use crate::models::domain::Difficulty;

pub const OPTIONS_PER_QUESTION: usize = 4;

/// A validated multiple-choice question. Only built by the synthesizer,
/// so `correct_answer` is always one of `options`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question {
            question: "What does HTTP stand for?".to_string(),
            options: vec![
                "HyperText Transfer Protocol".to_string(),
                "High Transfer Text Protocol".to_string(),
                "Hyperlink Transfer Protocol".to_string(),
                "Host Text Transport Protocol".to_string(),
            ],
            correct_answer: "HyperText Transfer Protocol".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn checks_options_and_correctness() {
        let question = sample();
        assert!(question.has_option("Hyperlink Transfer Protocol"));
        assert!(!question.has_option("None of the above"));
        assert!(question.is_correct("HyperText Transfer Protocol"));
        assert!(!question.is_correct("High Transfer Text Protocol"));
    }

    #[test]
    fn serializes_with_client_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("correctAnswer").is_some());
        assert_eq!(json["difficulty"], "easy");
    }
}
