//! OpenAI-compatible chat completion implementation.

use super::Completer;
use crate::config::CompletionSettings;
use crate::error::{Result, VidqaError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Completer backed by a `/chat/completions` endpoint.
///
/// The whole prompt is sent as a single system message.
pub struct OpenAICompleter {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAICompleter {
    /// Create a new completer from settings.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self> {
        let client = create_client(settings.base_url.as_deref(), settings.api_key.as_deref())?;
        Ok(Self {
            client,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    /// Model name requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| VidqaError::Completion(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| VidqaError::Completion(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            VidqaError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| VidqaError::Completion("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
