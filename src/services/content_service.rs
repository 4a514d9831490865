use std::sync::Arc;

use crate::{
    constants::prompts::{
        fill_template, CONTENT_GENERATION_PROMPT, MISTAKES_HEADING, NO_PREVIOUS_DATA,
        PERSONALIZED_CONTENT_PROMPT, PITFALLS_HEADING,
    },
    errors::AppResult,
    models::{
        domain::{Difficulty, Emotion},
        dto::request::PersonalizedContentRequest,
    },
    repositories::QuizAttemptRepository,
    services::{generator::TextGenerator, subject_service::SubjectService},
};

/// Number of past attempts quoted in the personalized prompt.
const HISTORY_IN_PROMPT: usize = 5;

pub struct ContentService {
    generator: Arc<dyn TextGenerator>,
    subject_service: Arc<SubjectService>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

struct HistoryLine {
    score: u8,
    emotion: Option<Emotion>,
    difficulty: Option<Difficulty>,
}

impl ContentService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        subject_service: Arc<SubjectService>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            generator,
            subject_service,
            attempts,
        }
    }

    /// Generates markdown for a subtopic, stores it and marks it generated.
    pub async fn generate_subtopic_content(&self, subject_id: &str, subtopic_id: &str) -> AppResult<String> {
        let (subject, subtopic) = self.subject_service.get_subtopic(subject_id, subtopic_id).await?;

        log::info!("Generating content for '{}' / '{}'", subject.name, subtopic.name);
        let prompt = fill_template(
            CONTENT_GENERATION_PROMPT,
            &[("TOPIC", &subtopic.name), ("SUBJECT", &subject.name)],
        );
        let content = normalize_headings(&self.generator.generate_text(&prompt).await?);

        self.subject_service
            .save_subtopic_content(subject_id, subtopic_id, content.clone())
            .await?;
        Ok(content)
    }

    /// Simplified remedial material shaped by the student's recent results
    /// and mood. Nothing is stored.
    pub async fn personalized_content(
        &self,
        user_id: &str,
        subject_id: &str,
        subtopic_id: &str,
        request: PersonalizedContentRequest,
    ) -> AppResult<String> {
        let (subject, subtopic) = self.subject_service.get_subtopic(subject_id, subtopic_id).await?;

        let history: Vec<HistoryLine> = if request.quiz_history.is_empty() {
            self.attempts
                .find_history(user_id, subtopic_id)
                .await?
                .into_iter()
                .map(|a| HistoryLine {
                    score: a.score,
                    emotion: Some(a.emotion),
                    difficulty: Some(a.difficulty),
                })
                .collect()
        } else {
            request
                .quiz_history
                .into_iter()
                .map(|h| HistoryLine {
                    score: h.score,
                    emotion: h.emotion,
                    difficulty: h.difficulty,
                })
                .collect()
        };

        let emotion = request
            .current_emotion
            .or_else(|| history.last().and_then(|h| h.emotion))
            .unwrap_or_default();
        let attempts = request.subtopic_attempts.max(history.len() as u32).to_string();

        let prompt = fill_template(
            PERSONALIZED_CONTENT_PROMPT,
            &[
                ("TOPIC", &subtopic.name),
                ("SUBJECT", &subject.name),
                ("EMOTION", emotion.as_str()),
                ("ATTEMPTS", &attempts),
                ("HISTORY", &format_history(&history)),
            ],
        );

        log::info!(
            "Generating personalized content for '{}' ({} past attempts, emotion {})",
            subtopic.name,
            history.len(),
            emotion
        );
        let content = self.generator.generate_text(&prompt).await?;
        Ok(normalize_headings(&content))
    }
}

fn format_history(history: &[HistoryLine]) -> String {
    if history.is_empty() {
        return format!("- {}", NO_PREVIOUS_DATA);
    }

    history[history.len().saturating_sub(HISTORY_IN_PROMPT)..]
        .iter()
        .map(|h| {
            format!(
                "- score {}%, emotion {}, difficulty {}",
                h.score,
                h.emotion.map(|e| e.as_str()).unwrap_or("unknown"),
                h.difficulty.map(|d| d.as_str()).unwrap_or("unknown"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn normalize_headings(content: &str) -> String {
    content.replace(PITFALLS_HEADING, MISTAKES_HEADING)
}
