use thiserror::Error;

use crate::llm::LlmType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} API key is required (set CHAT_API_KEY or {env_var})")]
    MissingApiKey {
        provider: LlmType,
        env_var: &'static str,
    },

    #[error("Invalid LLM type: '{0}'")]
    InvalidLlmType(String),

    #[error("model identifier is empty")]
    EmptyModel,

    #[error("invalid HTTP client setup: {0}")]
    HttpClient(String),

    #[error("failed to build {provider} client: {reason}")]
    Provider {
        provider: LlmType,
        reason: String,
    },
}

/// Failure of a single provider call. Reported per turn, never fatal to the loop.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider returned an empty reply")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node '{0}' is defined more than once")]
    DuplicateNode(String),

    #[error("edge refers to unknown node '{0}'")]
    UnknownNode(String),

    #[error("no edge leaves the start marker")]
    MissingEntry,

    #[error("node '{0}' has more than one outgoing edge")]
    Branching(String),

    #[error("edge cycle through node '{0}'")]
    Cycle(String),

    #[error("node '{node}' failed: {source}")]
    Node {
        node: String,
        #[source]
        source: GenerationError,
    },
}

/// Reading a line from the input stream did not produce one.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input stream closed")]
    Closed,

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// True when the error came from the provider call and the session can go on.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, ChatError::Graph(GraphError::Node { .. }))
    }
}
