use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use super::{ ChatClient, check_status, non_empty };
use crate::error::{ ConfigError, GenerationError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;
use log::debug;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| LlmType::Ollama.default_model().to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            temperature: None,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        if config.llm_type != LlmType::Ollama {
            return Err(ConfigError::InvalidLlmType(config.llm_type.to_string()));
        }

        let mut client = Self::new(config.base_url.clone(), Some(config.model.clone()));
        client.temperature = config.temperature;
        Ok(client)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError> {
        let url = self.chat_url();
        debug!("OllamaClient::chat() → model={} url={}", self.completion_model, url);
        let req = ChatRequest {
            model: &self.completion_model,
            messages,
            stream: false,
            options: self.temperature.map(|temperature| ChatOptions { temperature }),
        };
        let resp = self.http.post(&url).json(&req).send().await?;
        let data = check_status(resp).await?.json::<ChatResponse>().await?;
        non_empty(data.message.content)
    }

    fn model(&self) -> &str {
        &self.completion_model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Ollama
    }
}
