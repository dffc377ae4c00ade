use async_trait::async_trait;
use log::debug;

use super::{ ChatClient, non_empty };
use crate::error::{ ConfigError, GenerationError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::{ ChatMessage, Role };
use rllm::chat::{ ChatMessage as RllmMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

pub struct GeminiChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    api_key: String,
    model: String,
    base_url: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

/// Splits a history into the system instruction and the user/assistant turns.
fn to_rllm_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<RllmMessage>) {
    let mut system = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());
    for msg in messages {
        let role = match msg.role() {
            Role::System => {
                system.push(msg.content());
                continue;
            }
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        turns.push(RllmMessage {
            role,
            content: msg.content().to_string(),
            message_type: MessageType::Text,
        });
    }
    let system = if system.is_empty() { None } else { Some(system.join("\n\n")) };
    (system, turns)
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        system_prompt: Option<String>
    ) -> Result<Self, ConfigError> {
        let chat_model = model.unwrap_or_else(|| LlmType::Gemini.default_model().to_string());
        let builder = Self::builder(
            &api_key,
            &chat_model,
            base_url.as_deref(),
            max_tokens,
            temperature,
            system_prompt.as_deref()
        );
        let llm_provider = builder.build().map_err(|e| ConfigError::Provider {
            provider: LlmType::Gemini,
            reason: e.to_string(),
        })?;

        Ok(Self {
            llm: llm_provider,
            api_key,
            model: chat_model,
            base_url,
            max_tokens,
            temperature,
            system_prompt,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        Self::new(
            api_key,
            Some(config.model.clone()),
            config.base_url.clone(),
            config.max_tokens,
            config.temperature,
            config.system_prompt.clone()
        )
    }

    fn builder(
        api_key: &str,
        model: &str,
        base_url: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        system: Option<&str>
    ) -> LLMBuilder {
        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key.to_string())
            .model(model)
            .stream(false);

        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }
        if let Some(tokens) = max_tokens {
            builder = builder.max_tokens(tokens);
        }
        if let Some(temp) = temperature {
            builder = builder.temperature(temp);
        }
        if let Some(instruction) = system {
            builder = builder.system(instruction);
        }
        builder
    }

    /// True when `system` matches the instruction the prebuilt provider carries.
    fn reuses_prebuilt(&self, system: Option<&str>) -> bool {
        system == self.system_prompt.as_deref()
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError> {
        let (system, turns) = to_rllm_messages(messages);
        debug!(
            "GeminiChatClient::chat() → model={} base_url={:?} messages={}",
            self.model,
            self.base_url,
            turns.len()
        );

        // The system instruction is fixed at build time; only a history whose
        // instruction differs from the configured one needs its own provider.
        let resp = if self.reuses_prebuilt(system.as_deref()) {
            self.llm.chat(&turns).await
        } else {
            let llm = Self::builder(
                &self.api_key,
                &self.model,
                self.base_url.as_deref(),
                self.max_tokens,
                self.temperature,
                system.as_deref()
            )
                .build()
                .map_err(|e| GenerationError::Provider(e.to_string()))?;
            llm.chat(&turns).await
        }.map_err(|e| GenerationError::Provider(e.to_string()))?;

        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        non_empty(text)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Gemini
    }
}
