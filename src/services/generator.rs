use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::{config::GeneratorConfig, errors::QuizError};

/// The only seam between the quiz engine and the language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, QuizError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTextGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.api_base);

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, QuizError> {
        log::debug!(
            "Calling generator model '{}' with a {} character prompt",
            self.model,
            prompt.len()
        );

        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response: ChatCompletion = self
            .client
            .chat()
            .create_byot(request)
            .await
            .map_err(|e| {
                log::error!("Generator request to '{}' failed: {}", self.model, e);
                QuizError::GenerationUnavailable(e.to_string())
            })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                QuizError::GenerationUnavailable("generator returned no choices".to_string())
            })?;

        log::debug!("Generator '{}' replied with {} characters", self.model, text.len());
        Ok(text)
    }
}
