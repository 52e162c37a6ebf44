//! OpenAI chat completions.

use super::{Completer, Completion, CompletionRequest, TokenUsage};
use crate::error::{Result, Stage, TubeQueryError};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Completer backed by the OpenAI chat API.
pub struct OpenAICompleter {
    client: OpenAIClient,
}

impl OpenAICompleter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
        })
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    #[instrument(skip(self, request), fields(model = %request.model, prompt_len = request.prompt.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.clone())
                .build()
                .map_err(|e| TubeQueryError::external(Stage::Completion, e))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_output_tokens)
            .build()
            .map_err(|e| TubeQueryError::external(Stage::Completion, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            TubeQueryError::external(Stage::Completion, format!("Failed to generate response: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubeQueryError::external(Stage::Completion, "Empty response from LLM"))?
            .clone();

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!("Completion returned {} characters", text.len());

        Ok(Completion { text, usage })
    }
}
