pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod models;
pub mod repl;

use agent::ChatAgent;
use cli::Args;
use config::ChatbotConfig;
use error::ChatError;
use log::info;
use repl::{ Repl, SessionEnd };
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<SessionEnd, ChatError> {
    let config = ChatbotConfig::from_args(&args)?;
    config.log_summary();

    let agent = ChatAgent::new(&config)?;
    let mut repl = Repl::new(agent, config.repl.clone());
    let end = repl.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("Session ended ({:?}) after {} messages", end, repl.transcript().len());

    Ok(end)
}
