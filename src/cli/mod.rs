//! CLI module — command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod chat;
pub mod config;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "turnkeep")]
#[command(version)]
#[command(about = "Minimal conversational agent with tool calling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (interactive unless --message is given)
    Chat {
        /// Single message to send (non-interactive mode)
        #[arg(short, long)]
        message: Option<String>,
        /// Override the history window budget (approximate tokens)
        #[arg(long)]
        budget: Option<usize>,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API key masked)
    Show,
    /// Validate the configuration file and environment
    Check,
}

/// Parse arguments and dispatch to the matching command.
pub async fn run() -> Result<()> {
    // Pick up a local .env before config reads the environment.
    let _ = dotenvy::dotenv();

    // Fall back to default logging if the config file is missing or unreadable;
    // `config check` reports the actual problem.
    let logging_cfg = turnkeep::config::Config::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    if let Err(e) = turnkeep::utils::logging::init_logging(&logging_cfg) {
        eprintln!("Warning: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Chat { message, budget }) => {
            chat::cmd_chat(message, budget).await?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action).await?;
        }
    }

    Ok(())
}
