use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};

use super::{ChatClient, check_status, non_empty};
use crate::error::{ConfigError, GenerationError};
use crate::llm::{LlmConfig, LlmType};
use crate::models::chat::ChatMessage;

const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

impl OpenAIResponse {
    fn into_reply(self) -> Result<ChatMessage, GenerationError> {
        let text = self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(text)
    }
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let chat_model = model.unwrap_or_else(|| LlmType::OpenAI.default_model().to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_CHAT_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ConfigError::HttpClient(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
            temperature,
            max_tokens,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        Self::new(
            api_key,
            Some(config.model.clone()),
            config.base_url.clone(),
            config.temperature,
            config.max_tokens,
        )
    }

    fn build_request(&self, messages: &[ChatMessage]) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role().as_str().to_string(),
                    content: m.content().to_string(),
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError> {
        let url = self.base_url.trim_end_matches('/');
        debug!("OpenAIChatClient::chat() → model={} url={} messages={}", self.model, url, messages.len());

        let req = self.build_request(messages);
        let resp = self.http.post(url).json(&req).send().await?;
        let data = check_status(resp).await?.json::<OpenAIResponse>().await?;
        data.into_reply()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::OpenAI
    }
}
