//! Resolves command-line arguments into the validated runtime configuration.

use log::info;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::llm::{ parse_model_id, LlmConfig, LlmType };
use crate::repl::ReplOptions;

#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub llm: LlmConfig,
    pub repl: ReplOptions,
}

impl ChatbotConfig {
    /// Reads provider variables from the process environment.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// `lookup` supplies provider-specific key variables such as `GOOGLE_API_KEY`.
    pub fn resolve<F>(args: &Args, lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let (prefixed, model) = match args.model.as_deref() {
            Some(id) => parse_model_id(id),
            None => (None, ""),
        };
        let llm_type = match (prefixed, &args.chat_llm_type) {
            (Some(llm_type), _) => llm_type,
            (None, Some(s)) if !s.trim().is_empty() => s.parse()?,
            _ => LlmType::Gemini,
        };
        let model = if args.model.is_none() { llm_type.default_model() } else { model };
        if model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let api_key = Some(args.chat_api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .or_else(|| llm_type.api_key_env().and_then(|var| lookup(var)))
            .filter(|k| !k.trim().is_empty());

        let llm = LlmConfig {
            llm_type,
            api_key,
            model: model.to_string(),
            base_url: args.chat_base_url.clone().filter(|u| !u.trim().is_empty()),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
            system_prompt: args.system_prompt.clone().filter(|p| !p.trim().is_empty()),
        };
        // Fail at startup, not on the first turn.
        llm.require_api_key()?;

        Ok(Self {
            llm,
            repl: ReplOptions {
                prompt: args.prompt.clone(),
                fallback_question: args.fallback_question.clone(),
                keep_history: args.keep_history,
                ..ReplOptions::default()
            },
        })
    }

    pub fn log_summary(&self) {
        info!("--- Core Configuration ---");
        info!("Chat LLM Type: {}", self.llm.llm_type);
        info!("Chat Model: {}", self.llm.model);
        info!("Chat Base URL: {}", self.llm.base_url.as_deref().unwrap_or("adapter default"));
        info!("API Key: {}", if self.llm.api_key.is_some() { "set" } else { "not set" });
        info!("System Prompt: {}", self.llm.system_prompt.is_some());
        info!("Keep History: {}", self.repl.keep_history);
        info!("-------------------------");
    }
}
