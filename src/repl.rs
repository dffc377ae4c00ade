//! Line-oriented read/print loop around a [`ChatAgent`].

use futures::StreamExt;
use log::{ debug, info, warn };
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::agent::ChatAgent;
use crate::error::{ ChatError, InputError };
use crate::models::chat::{ ChatMessage, Conversation };

pub const DEFAULT_FALLBACK_QUESTION: &str = "What do you know about LangGraph?";
pub const EXIT_KEYWORDS: [&str; 3] = ["quit", "exit", "q"];
const FAREWELL: &str = "Goodbye!";

#[derive(Debug, Clone, PartialEq)]
pub struct ReplOptions {
    pub prompt: String,
    pub fallback_question: String,
    pub exit_keywords: Vec<String>,
    pub keep_history: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            prompt: "User: ".to_string(),
            fallback_question: DEFAULT_FALLBACK_QUESTION.to_string(),
            exit_keywords: EXIT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            keep_history: false,
        }
    }
}

impl ReplOptions {
    pub fn is_exit(&self, line: &str) -> bool {
        let line = line.trim();
        self.exit_keywords.iter().any(|k| k.eq_ignore_ascii_case(line))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed an exit keyword.
    Quit,
    /// Input ran out; the fallback question was answered.
    InputClosed,
}

pub struct Repl {
    agent: ChatAgent,
    options: ReplOptions,
    transcript: Conversation,
}

/// Reads one line without its terminator.
async fn read_input<R>(input: &mut R) -> Result<String, InputError> where R: AsyncBufRead + Unpin {
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Err(InputError::Closed);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

impl Repl {
    pub fn new(agent: ChatAgent, options: ReplOptions) -> Self {
        Self { agent, options, transcript: Conversation::new() }
    }

    /// Successful turns so far, one user and one assistant message each.
    pub fn transcript(&self) -> &Conversation {
        &self.transcript
    }

    /// Reads lines until an exit keyword or until input is unavailable.
    ///
    /// Lines that are empty after trimming are skipped and never reach the
    /// provider. Losing input triggers one fallback turn and ends the session.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<SessionEnd, ChatError>
        where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
    {
        loop {
            output.write_all(self.options.prompt.as_bytes()).await?;
            output.flush().await?;

            let line = match read_input(&mut input).await {
                Ok(line) => line,
                Err(e) => {
                    info!("No interactive input ({}), asking fallback question", e);
                    return self.run_fallback(&mut output).await;
                }
            };

            if self.options.is_exit(&line) {
                output.write_all(format!("{FAREWELL}\n").as_bytes()).await?;
                output.flush().await?;
                return Ok(SessionEnd::Quit);
            }
            if line.trim().is_empty() {
                continue;
            }

            match self.turn(&line, &mut output).await {
                Ok(()) => {}
                Err(e) if e.is_generation_failure() => {
                    warn!("Turn failed: {}", e);
                    output.write_all(format!("Error: {e}\n").as_bytes()).await?;
                    output.flush().await?;
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }
    }

    async fn run_fallback<W>(&mut self, output: &mut W) -> Result<SessionEnd, ChatError>
        where W: AsyncWrite + Unpin
    {
        let question = self.options.fallback_question.clone();
        output.write_all(format!("\nUser: {question}\n").as_bytes()).await?;
        self.turn(&question, output).await?;
        Ok(SessionEnd::InputClosed)
    }

    /// Runs one user message through the agent and prints each update.
    async fn turn<W>(&mut self, text: &str, output: &mut W) -> Result<(), ChatError>
        where W: AsyncWrite + Unpin
    {
        let user = ChatMessage::user(text);
        let input = if self.options.keep_history {
            self.transcript.extended_with(user.clone())
        } else {
            Conversation::from(vec![user.clone()])
        };
        debug!("turn input has {} messages", input.len());

        let mut replies = Conversation::new();
        {
            let mut events = self.agent.stream(input);
            while let Some(event) = events.next().await {
                let event = event?;
                if let Some(last) = event.update.last() {
                    output.write_all(format!("Assistant: {}\n", last.content()).as_bytes()).await?;
                    output.flush().await?;
                }
                replies.merge(event.update);
            }
        }

        self.transcript.push(user);
        self.transcript.merge(replies);
        Ok(())
    }
}
