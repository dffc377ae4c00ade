pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Gemini,
    OpenAI,
    Ollama,
    Echo,
}

impl LlmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmType::Gemini => "gemini",
            LlmType::OpenAI => "openai",
            LlmType::Ollama => "ollama",
            LlmType::Echo => "echo",
        }
    }

    /// Provider-specific variable consulted when no explicit key is given.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmType::Gemini => Some("GOOGLE_API_KEY"),
            LlmType::OpenAI => Some("OPENAI_API_KEY"),
            LlmType::Ollama | LlmType::Echo => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmType::Gemini => "gemini-2.0-flash",
            LlmType::OpenAI => "gpt-4o",
            LlmType::Ollama => "llama3.2",
            LlmType::Echo => "echo",
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" | "google_genai" => Ok(LlmType::Gemini),
            "openai" => Ok(LlmType::OpenAI),
            "ollama" => Ok(LlmType::Ollama),
            "echo" => Ok(LlmType::Echo),
            _ => Err(ConfigError::InvalidLlmType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

impl LlmConfig {
    pub fn new(llm_type: LlmType) -> Self {
        Self {
            llm_type,
            api_key: None,
            model: llm_type.default_model().to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            system_prompt: None,
        }
    }

    /// The API key, or `MissingApiKey` when the provider needs one.
    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        match (&self.api_key, self.llm_type.api_key_env()) {
            (Some(key), _) if !key.trim().is_empty() => Ok(key.clone()),
            (_, Some(env_var)) => Err(ConfigError::MissingApiKey { provider: self.llm_type, env_var }),
            (_, None) => Ok(String::new()),
        }
    }
}

/// Splits a `provider:model` identifier such as `google_genai:gemini-2.0-flash`.
///
/// The prefix only counts when it names a known provider, so Ollama tags like
/// `llama3:8b` stay intact.
pub fn parse_model_id(id: &str) -> (Option<LlmType>, &str) {
    let id = id.trim();
    match id.split_once(':') {
        Some((prefix, model)) => match prefix.parse::<LlmType>() {
            Ok(llm_type) => (Some(llm_type), model),
            Err(_) => (None, id),
        },
        None => (None, id),
    }
}
