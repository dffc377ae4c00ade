pub mod echo;
pub mod gemini;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::echo::EchoChatClient;
use self::gemini::GeminiChatClient;
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;
use crate::error::{ ConfigError, GenerationError };
use crate::models::chat::ChatMessage;

/// Produces one assistant reply for a full, ordered message history.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError>;

    fn model(&self) -> &str;

    fn llm_type(&self) -> LlmType;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Echo => Arc::new(EchoChatClient::new()),
    };
    Ok(client)
}

/// Turns a non-success HTTP response into `GenerationError::Status`, keeping the body.
pub(crate) async fn check_status(
    resp: reqwest::Response
) -> Result<reqwest::Response, GenerationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}

/// Rejects replies with no visible text.
pub(crate) fn non_empty(text: String) -> Result<ChatMessage, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(ChatMessage::assistant(text))
}
