//! Chat command handler (interactive + single message).

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use turnkeep::agent::{TurnRunner, TurnSettings};
use turnkeep::config::Config;
use turnkeep::providers::openai::OPENAI_API_URL;
use turnkeep::providers::OpenAIResponsesProvider;
use turnkeep::session::ConversationStore;
use turnkeep::tools::{ClockTool, EchoTool, ToolRegistry};

/// Build a runner from config: the Responses provider plus the built-in tools.
fn create_runner(config: &Config) -> Result<TurnRunner> {
    let api_key = config.api_key()?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    let api_base = config
        .provider
        .api_base
        .as_deref()
        .unwrap_or(OPENAI_API_URL);
    let provider = OpenAIResponsesProvider::with_client(api_key, api_base, client);

    let mut tools = ToolRegistry::new();
    tools.register(Box::new(EchoTool));
    tools.register(Box::new(ClockTool));

    Ok(TurnRunner::new(
        Arc::new(provider),
        tools,
        TurnSettings::from_config(&config.agent),
    ))
}

/// Interactive or single-message chat.
pub(crate) async fn cmd_chat(message: Option<String>, budget: Option<usize>) -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    config.validate()?;

    let runner = create_runner(&config).with_context(|| {
        format!(
            "No usable provider; add an API key to {:?} or set TURNKEEP_PROVIDER_API_KEY",
            Config::path()
        )
    })?;
    let mut store = ConversationStore::new(budget.unwrap_or(config.agent.token_budget));

    if let Some(msg) = message {
        let reply = runner.run_turn(&mut store, Some(&msg)).await?;
        println!("{}", reply);
        return Ok(());
    }

    println!("Turnkeep ({})", runner.settings().model);
    println!("Tools: {}", runner.tools().names().join(", "));
    println!("Type your message and press Enter. Type 'quit' or 'exit' to stop.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "quit" || input == "exit" {
                    println!("Goodbye!");
                    break;
                }

                match runner.run_turn(&mut store, Some(input)).await {
                    Ok(reply) => {
                        println!();
                        println!("{}", reply);
                        println!();
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!();
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    Ok(())
}
