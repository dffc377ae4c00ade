//! Minimal execution graph.
//!
//! Nodes are joined by edges into a single chain that starts at [`START`].
//! Running the graph feeds each node the input merged with every earlier
//! update and yields each node's update as one [`GraphEvent`].

use async_trait::async_trait;
use futures::stream::{ self, BoxStream, StreamExt };
use log::debug;
use std::collections::{ HashMap, HashSet };
use std::sync::Arc;

use crate::error::{ GenerationError, GraphError };
use crate::models::chat::Conversation;

/// Source marker for the entry edge.
pub const START: &str = "__start__";

#[async_trait]
pub trait Node: Send + Sync {
    /// Returns the messages this node adds to `state`.
    async fn run(&self, state: &Conversation) -> Result<Conversation, GenerationError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Processing,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEvent {
    pub node: String,
    pub update: Conversation,
}

#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<(String, Arc<dyn Node>)>,
    edges: Vec<(String, String)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, name: impl Into<String>, node: impl Node + 'static) -> Self {
        self.nodes.push((name.into(), Arc::new(node)));
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    pub fn compile(self) -> Result<CompiledGraph, GraphError> {
        let mut by_name: HashMap<String, Arc<dyn Node>> = HashMap::new();
        for (name, node) in self.nodes {
            if name == START || by_name.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            by_name.insert(name, node);
        }

        let mut next: HashMap<&str, &str> = HashMap::new();
        for (from, to) in &self.edges {
            if from != START && !by_name.contains_key(from) {
                return Err(GraphError::UnknownNode(from.clone()));
            }
            if !by_name.contains_key(to) {
                return Err(GraphError::UnknownNode(to.clone()));
            }
            if next.insert(from.as_str(), to.as_str()).is_some() {
                return Err(GraphError::Branching(from.clone()));
            }
        }

        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = *next.get(START).ok_or(GraphError::MissingEntry)?;
        loop {
            if !seen.insert(cursor) {
                return Err(GraphError::Cycle(cursor.to_string()));
            }
            // Every edge target was checked above.
            if let Some(node) = by_name.get(cursor) {
                chain.push((cursor.to_string(), Arc::clone(node)));
            }
            match next.get(cursor) {
                Some(to) => cursor = *to,
                None => break,
            }
        }

        Ok(CompiledGraph { chain })
    }
}

pub struct CompiledGraph {
    chain: Vec<(String, Arc<dyn Node>)>,
}

impl CompiledGraph {
    /// Node names in execution order.
    pub fn node_names(&self) -> Vec<&str> {
        self.chain.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Runs the chain, yielding one event per node. The stream ends after the
    /// last node or after the first failure.
    pub fn stream(&self, input: Conversation) -> BoxStream<'_, Result<GraphEvent, GraphError>> {
        debug!("graph phase {:?} → {:?}", Phase::Start, Phase::Processing);
        stream::unfold(Some((input, 0usize)), move |cursor| async move {
            let Some((mut state, step)) = cursor else {
                return None;
            };
            let Some((name, node)) = self.chain.get(step) else {
                debug!("graph phase {:?} → {:?}", Phase::Processing, Phase::Done);
                return None;
            };
            debug!("running node '{}' on {} messages", name, state.len());
            match node.run(&state).await {
                Ok(update) => {
                    state.merge(update.clone());
                    let event = GraphEvent { node: name.clone(), update };
                    Some((Ok(event), Some((state, step + 1))))
                }
                Err(source) => {
                    let err = GraphError::Node { node: name.clone(), source };
                    Some((Err(err), None))
                }
            }
        }).boxed()
    }

    /// Runs the chain to completion and returns the final state.
    pub async fn invoke(&self, input: Conversation) -> Result<Conversation, GraphError> {
        let mut state = input.clone();
        let mut events = self.stream(input);
        while let Some(event) = events.next().await {
            state.merge(event?.update);
        }
        Ok(state)
    }
}
