use std::{collections::HashSet, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::prompts::{fill_template, QUIZ_GENERATION_PROMPT},
    errors::{GenerationStage, QuizError},
    models::domain::{question::OPTIONS_PER_QUESTION, quiz_session::QUESTIONS_PER_SESSION, Difficulty, Question},
    services::generator::TextGenerator,
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[A-Za-z]*").expect("CODE_FENCE is a valid regex pattern")
});

static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[.*\]").expect("JSON_ARRAY is a valid regex pattern")
});

/// One question as the model is asked to produce it. Only used to derive
/// the schema embedded in the prompt; replies are validated field by field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    /// The question text.
    pub question: String,
    /// Exactly four distinct answer options.
    pub options: Vec<String>,
    /// The correct option, repeated verbatim.
    pub correct_answer: String,
}

static QUESTION_SCHEMA: Lazy<String> = Lazy::new(|| {
    serde_json::to_string_pretty(&schema_for!(GeneratedQuestion)).unwrap_or_default()
});

#[derive(Clone)]
pub struct QuestionSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl QuestionSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn build_prompt(topic_name: &str, subject_name: &str, difficulty: Difficulty) -> String {
        fill_template(
            QUIZ_GENERATION_PROMPT,
            &[
                ("TOPIC", topic_name),
                ("SUBJECT", subject_name),
                ("DIFFICULTY", difficulty.as_str()),
                ("QUESTION_SCHEMA", QUESTION_SCHEMA.as_str()),
            ],
        )
    }

    /// One generator call, then strict validation. Any violation rejects
    /// the whole batch.
    pub async fn synthesize_questions(
        &self,
        topic_name: &str,
        subject_name: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, QuizError> {
        let prompt = Self::build_prompt(topic_name, subject_name, difficulty);
        let reply = self.generator.generate_text(&prompt).await?;

        let questions = parse_questions(&reply, difficulty).inspect_err(|e| {
            log::error!(
                "Rejected generated {} quiz for '{}' / '{}': {}",
                difficulty,
                subject_name,
                topic_name,
                e
            );
        })?;

        log::info!(
            "Generated {} {} questions for '{}' / '{}'",
            questions.len(),
            difficulty,
            subject_name,
            topic_name
        );
        Ok(questions)
    }
}

/// Fence markers removed, then the outermost `[` ... `]` span.
pub fn extract_json_array(reply: &str) -> Option<String> {
    let stripped = CODE_FENCE.replace_all(reply, "");
    JSON_ARRAY.find(&stripped).map(|m| m.as_str().to_string())
}

pub fn parse_questions(reply: &str, difficulty: Difficulty) -> Result<Vec<Question>, QuizError> {
    let json = extract_json_array(reply).ok_or_else(|| QuizError::MalformedGeneration {
        stage: GenerationStage::Extract,
        detail: "no JSON array found in the reply".to_string(),
    })?;

    let value: Value = serde_json::from_str(&json).map_err(|e| QuizError::MalformedGeneration {
        stage: GenerationStage::Parse,
        detail: e.to_string(),
    })?;

    let items = value.as_array().ok_or_else(|| QuizError::MalformedGeneration {
        stage: GenerationStage::Parse,
        detail: "top-level value is not an array".to_string(),
    })?;

    if items.len() != QUESTIONS_PER_SESSION {
        return Err(QuizError::InvalidQuestionCount {
            found: items.len(),
            expected: QUESTIONS_PER_SESSION,
        });
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            validate_question(item, difficulty)
                .map_err(|reason| QuizError::InvalidQuestionFormat { index, reason })
        })
        .collect()
}

fn text_field<'a>(item: &'a Value, field: &str) -> Result<&'a str, String> {
    let text = item
        .get(field)
        .ok_or_else(|| format!("missing '{}'", field))?
        .as_str()
        .ok_or_else(|| format!("'{}' is not a string", field))?
        .trim();

    if text.is_empty() {
        return Err(format!("'{}' is empty", field));
    }
    Ok(text)
}

fn validate_question(item: &Value, difficulty: Difficulty) -> Result<Question, String> {
    if !item.is_object() {
        return Err("question is not a JSON object".to_string());
    }

    let question = text_field(item, "question")?;

    let raw_options = item
        .get("options")
        .ok_or_else(|| "missing 'options'".to_string())?
        .as_array()
        .ok_or_else(|| "'options' is not an array".to_string())?;

    if raw_options.len() != OPTIONS_PER_QUESTION {
        return Err(format!(
            "expected {} options, found {}",
            OPTIONS_PER_QUESTION,
            raw_options.len()
        ));
    }

    let mut options = Vec::with_capacity(OPTIONS_PER_QUESTION);
    let mut seen = HashSet::new();
    for (position, option) in raw_options.iter().enumerate() {
        let text = option
            .as_str()
            .ok_or_else(|| format!("option {} is not a string", position))?
            .trim();
        if text.is_empty() {
            return Err(format!("option {} is empty", position));
        }
        if !seen.insert(text) {
            return Err(format!("option '{}' appears more than once", text));
        }
        options.push(text.to_string());
    }

    let correct_answer = text_field(item, "correctAnswer")?;
    if !options.iter().any(|o| o == correct_answer) {
        return Err(format!(
            "correct answer '{}' is not one of the options",
            correct_answer
        ));
    }

    Ok(Question {
        question: question.to_string(),
        options,
        correct_answer: correct_answer.to_string(),
        difficulty,
    })
}
