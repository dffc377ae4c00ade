//! Offline provider that echoes the latest user message back prefixed with
//! `[echo]`. Needs no key; used for demos and tests.

use async_trait::async_trait;

use super::ChatClient;
use crate::error::GenerationError;
use crate::llm::LlmType;
use crate::models::chat::{ ChatMessage, Conversation };

#[derive(Debug, Clone, Default)]
pub struct EchoChatClient;

impl EchoChatClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatClient for EchoChatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError> {
        let conversation = Conversation::from(messages.to_vec());
        let content = conversation.last_user_content().unwrap_or_default();
        Ok(ChatMessage::assistant(format!("[echo] {content}")))
    }

    fn model(&self) -> &str {
        "echo"
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Echo
    }
}
