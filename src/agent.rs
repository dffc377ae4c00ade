use async_trait::async_trait;
use futures::stream::BoxStream;
use log::info;
use std::sync::Arc;

use crate::config::ChatbotConfig;
use crate::error::{ ChatError, GenerationError, GraphError };
use crate::graph::{ CompiledGraph, GraphBuilder, GraphEvent, Node, START };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::chat::{ ChatMessage, Conversation };

pub const CHATBOT_NODE: &str = "chatbot";

/// Returns `conversation` with the client's reply appended.
pub async fn process_turn(
    client: &dyn ChatClient,
    conversation: &Conversation
) -> Result<Conversation, GenerationError> {
    let reply = client.chat(conversation.messages()).await?;
    Ok(conversation.extended_with(reply))
}

/// Graph node that asks the client for one reply to the whole state.
pub struct TurnProcessor {
    client: Arc<dyn ChatClient>,
}

impl TurnProcessor {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Node for TurnProcessor {
    async fn run(&self, state: &Conversation) -> Result<Conversation, GenerationError> {
        let next = process_turn(self.client.as_ref(), state).await?;
        Ok(Conversation::from(next.messages()[state.len()..].to_vec()))
    }
}

pub struct ChatAgent {
    graph: CompiledGraph,
    system_prompt: Option<String>,
}

impl ChatAgent {
    pub fn new(config: &ChatbotConfig) -> Result<Self, ChatError> {
        let chat_client = new_chat_client(&config.llm)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={:?}",
            chat_client.llm_type(),
            chat_client.model(),
            config.llm.base_url.as_deref().unwrap_or("adapter default")
        );
        Ok(Self::with_client(chat_client, config.llm.system_prompt.clone())?)
    }

    /// Builds the `START → chatbot` graph around an existing client.
    pub fn with_client(
        client: Arc<dyn ChatClient>,
        system_prompt: Option<String>
    ) -> Result<Self, GraphError> {
        let graph = GraphBuilder::new()
            .add_node(CHATBOT_NODE, TurnProcessor::new(client))
            .add_edge(START, CHATBOT_NODE)
            .compile()?;
        let system_prompt = system_prompt.filter(|p| !p.trim().is_empty());
        Ok(Self { graph, system_prompt })
    }

    /// Prefixes the system prompt, when one is configured.
    pub fn prepare(&self, input: Conversation) -> Conversation {
        match &self.system_prompt {
            Some(prompt) => {
                let mut prepared = Conversation::from(vec![ChatMessage::system(prompt.clone())]);
                prepared.merge(input);
                prepared
            }
            None => input,
        }
    }

    pub fn stream(&self, input: Conversation) -> BoxStream<'_, Result<GraphEvent, GraphError>> {
        self.graph.stream(self.prepare(input))
    }
}
