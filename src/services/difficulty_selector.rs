use std::sync::Arc;

use crate::{
    constants::prompts::{fill_template, DIFFICULTY_SELECTION_PROMPT, NO_PREVIOUS_DATA},
    errors::QuizError,
    models::domain::{Difficulty, QuizHints},
    services::generator::TextGenerator,
};

/// Picks the next quiz difficulty with a single generator call.
#[derive(Clone)]
pub struct DifficultySelector {
    generator: Arc<dyn TextGenerator>,
}

impl DifficultySelector {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn build_prompt(hints: &QuizHints) -> String {
        let score = hints
            .previous_score
            .map(|s| format!("{}%", s))
            .unwrap_or_else(|| NO_PREVIOUS_DATA.to_string());
        let emotion = hints
            .previous_emotion
            .map(|e| e.to_string())
            .unwrap_or_else(|| NO_PREVIOUS_DATA.to_string());
        let difficulty = hints
            .previous_difficulty
            .map(|d| d.to_string())
            .unwrap_or_else(|| NO_PREVIOUS_DATA.to_string());

        fill_template(
            DIFFICULTY_SELECTION_PROMPT,
            &[
                ("PREVIOUS_SCORE", &score),
                ("PREVIOUS_EMOTION", &emotion),
                ("PREVIOUS_DIFFICULTY", &difficulty),
            ],
        )
    }

    /// The reply must be exactly one difficulty label; there is no fallback.
    pub async fn select_difficulty(&self, hints: &QuizHints) -> Result<Difficulty, QuizError> {
        let reply = self.generator.generate_text(&Self::build_prompt(hints)).await?;

        let difficulty = Difficulty::normalize(&reply).inspect_err(|e| {
            log::error!("Difficulty selection failed: {}", e);
        })?;

        if hints.is_empty() {
            log::info!("Selected {} difficulty with no prior attempt", difficulty);
            return Ok(difficulty);
        }
        log::info!(
            "Selected {} difficulty (previous score: {:?}, emotion: {:?}, difficulty: {:?})",
            difficulty,
            hints.previous_score,
            hints.previous_emotion,
            hints.previous_difficulty
        );
        Ok(difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::domain::Emotion, services::generator::MockTextGenerator};
    use mockall::predicate::function;

    fn selector_replying(reply: &'static str) -> DifficultySelector {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate_text()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        DifficultySelector::new(Arc::new(generator))
    }

    #[test]
    fn prompt_uses_placeholder_without_history() {
        let prompt = DifficultySelector::build_prompt(&QuizHints::default());

        assert_eq!(prompt.matches(NO_PREVIOUS_DATA).count(), 3);
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn prompt_carries_previous_attempt() {
        let hints = QuizHints {
            previous_score: Some(80),
            previous_emotion: Some(Emotion::Happy),
            previous_difficulty: Some(Difficulty::Medium),
        };
        let prompt = DifficultySelector::build_prompt(&hints);

        assert!(prompt.contains("Score: 80%"));
        assert!(prompt.contains("Reported emotion: happy"));
        assert!(prompt.contains("Difficulty: medium"));
        assert!(!prompt.contains(NO_PREVIOUS_DATA));
    }

    #[tokio::test]
    async fn normalizes_reply() {
        let selector = selector_replying("  Hard\n");
        assert_eq!(
            selector.select_difficulty(&QuizHints::default()).await,
            Ok(Difficulty::Hard)
        );
    }

    #[tokio::test]
    async fn rejects_reply_outside_the_three_labels() {
        let selector = selector_replying("Medium-Hard");
        assert_eq!(
            selector.select_difficulty(&QuizHints::default()).await,
            Err(QuizError::InvalidDifficulty("Medium-Hard".to_string()))
        );
    }

    #[tokio::test]
    async fn propagates_generator_outage() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate_text()
            .with(function(|prompt: &str| prompt.contains("Score: 20%")))
            .returning(|_| Err(QuizError::GenerationUnavailable("quota exceeded".to_string())));
        let selector = DifficultySelector::new(Arc::new(generator));

        let hints = QuizHints {
            previous_score: Some(20),
            ..QuizHints::default()
        };
        assert!(matches!(
            selector.select_difficulty(&hints).await,
            Err(QuizError::GenerationUnavailable(_))
        ));
    }
}
