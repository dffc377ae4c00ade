use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal chatbot backed by an LLM provider", long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Model identifier, optionally prefixed with its provider (e.g., google_genai:gemini-2.0-flash, openai:gpt-4o, ollama:llama3:8b)
    #[arg(long, env = "CHAT_MODEL")] // No default, the provider's default model is used if None
    pub model: Option<String>,

    /// Type of LLM provider when the model is absent or carries no provider prefix (gemini, openai, ollama, echo). Defaults to gemini
    #[arg(long, env = "CHAT_LLM_TYPE")]
    pub chat_llm_type: Option<String>,

    /// API Key for the Chat LLM provider. Falls back to the provider's own variable (GOOGLE_API_KEY, OPENAI_API_KEY)
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Sampling temperature passed to the provider
    #[arg(long, env = "CHAT_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Upper bound on reply length, in tokens
    #[arg(long, env = "CHAT_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    // --- Conversation Args ---
    /// System prompt sent ahead of every turn
    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// Send the whole session transcript with every turn instead of only the new message
    #[arg(long, env = "KEEP_HISTORY", default_value = "false")]
    pub keep_history: bool,

    /// Question asked once when no terminal input is available
    #[arg(long, env = "FALLBACK_QUESTION", default_value = "What do you know about LangGraph?")]
    pub fallback_question: String,

    /// Prompt printed before each read
    #[arg(long, env = "USER_PROMPT", default_value = "User: ")]
    pub prompt: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
